//! Fixed location domains shared by shops, policies and claims.
//!
//! Prefecture and city are independent lists: a shop's city is not
//! checked against its prefecture.

pub const PREFECTURES: &[&str] = &[
    "Tokyo", "Kanagawa", "Osaka", "Aichi", "Hokkaido",
    "Fukuoka", "Saitama", "Chiba", "Hyogo", "Kyoto",
];

pub const CITIES: &[&str] = &[
    "Shinjuku", "Yokohama", "Kita-ku", "Nagoya", "Sapporo",
    "Hakata", "Kawaguchi", "Funabashi", "Kobe", "Fushimi",
];
