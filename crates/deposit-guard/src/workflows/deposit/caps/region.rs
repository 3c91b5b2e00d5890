use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Statutory region classes used by the small-deposit protection decree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionClass {
    Seoul,
    OvercrowdingControlZone,
    MetropolitanCity,
    Other,
}

impl RegionClass {
    pub const fn label(self) -> &'static str {
        match self {
            RegionClass::Seoul => "seoul",
            RegionClass::OvercrowdingControlZone => "overcrowding_control_zone",
            RegionClass::MetropolitanCity => "metropolitan_city",
            RegionClass::Other => "other",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "seoul" => Some(Self::Seoul),
            "overcrowding_control_zone" => Some(Self::OvercrowdingControlZone),
            "metropolitan_city" => Some(Self::MetropolitanCity),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for RegionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Province {
    Seoul,
    Incheon,
    MetroCity,
    Sejong,
    Gyeonggi,
    Province,
}

const PROVINCE_TOKENS: &[(&str, Province)] = &[
    ("서울특별시", Province::Seoul),
    ("서울시", Province::Seoul),
    ("서울", Province::Seoul),
    ("seoul", Province::Seoul),
    ("인천광역시", Province::Incheon),
    ("인천시", Province::Incheon),
    ("인천", Province::Incheon),
    ("incheon", Province::Incheon),
    ("부산광역시", Province::MetroCity),
    ("부산", Province::MetroCity),
    ("busan", Province::MetroCity),
    ("대구광역시", Province::MetroCity),
    ("대구", Province::MetroCity),
    ("daegu", Province::MetroCity),
    ("광주광역시", Province::MetroCity),
    ("광주", Province::MetroCity),
    ("gwangju", Province::MetroCity),
    ("대전광역시", Province::MetroCity),
    ("대전", Province::MetroCity),
    ("daejeon", Province::MetroCity),
    ("울산광역시", Province::MetroCity),
    ("울산", Province::MetroCity),
    ("ulsan", Province::MetroCity),
    ("세종특별자치시", Province::Sejong),
    ("세종시", Province::Sejong),
    ("세종", Province::Sejong),
    ("sejong", Province::Sejong),
    ("경기도", Province::Gyeonggi),
    ("경기", Province::Gyeonggi),
    ("gyeonggi", Province::Gyeonggi),
    ("gyeonggi-do", Province::Gyeonggi),
    ("강원특별자치도", Province::Province),
    ("강원도", Province::Province),
    ("강원", Province::Province),
    ("충청북도", Province::Province),
    ("충북", Province::Province),
    ("충청남도", Province::Province),
    ("충남", Province::Province),
    ("전북특별자치도", Province::Province),
    ("전라북도", Province::Province),
    ("전북", Province::Province),
    ("전라남도", Province::Province),
    ("전남", Province::Province),
    ("경상북도", Province::Province),
    ("경북", Province::Province),
    ("경상남도", Province::Province),
    ("경남", Province::Province),
    ("제주특별자치도", Province::Province),
    ("제주도", Province::Province),
    ("제주", Province::Province),
    ("jeju", Province::Province),
];

/// Gyeonggi cities inside the capital-region overcrowding control zone since 2010.
const GYEONGGI_OVERCROWDED: &[&str] = &[
    "의정부", "구리", "하남", "고양", "수원", "성남", "안양", "부천", "광명", "과천", "의왕",
    "군포", "시흥", "남양주",
];

/// Gyeonggi cities whose class changed over time: `(city, effective_from, class)`.
/// Later rows override earlier ones once effective.
const GYEONGGI_RECLASSIFIED: &[(&str, (i32, u32, u32), RegionClass)] = &[
    ("안산", (2010, 7, 26), RegionClass::MetropolitanCity),
    ("광주", (2010, 7, 26), RegionClass::MetropolitanCity),
    ("용인", (2010, 7, 26), RegionClass::MetropolitanCity),
    ("용인", (2018, 9, 18), RegionClass::OvercrowdingControlZone),
    ("김포", (2010, 7, 26), RegionClass::MetropolitanCity),
    ("김포", (2021, 5, 11), RegionClass::OvercrowdingControlZone),
    ("화성", (2018, 9, 18), RegionClass::OvercrowdingControlZone),
    ("파주", (2018, 9, 18), RegionClass::MetropolitanCity),
    ("이천", (2021, 5, 11), RegionClass::MetropolitanCity),
    ("평택", (2021, 5, 11), RegionClass::MetropolitanCity),
];

const SEJONG_OVERCROWDED_FROM: (i32, u32, u32) = (2018, 9, 18);

/// Incheon districts outside the overcrowding control zone.
const INCHEON_EXCLUDED: &[&str] = &["강화", "옹진"];

fn date_of((year, month, day): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn normalize_address(address: &str) -> Vec<String> {
    address
        .replace(['\u{feff}', '\u{200b}', ','], " ")
        .split_whitespace()
        .map(|token| token.to_lowercase())
        .collect()
}

fn province_of(token: &str) -> Option<Province> {
    PROVINCE_TOKENS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, province)| *province)
}

/// City/county token with its administrative suffix removed (`수원시` -> `수원`).
fn locality(token: &str) -> &str {
    token
        .strip_suffix('시')
        .or_else(|| token.strip_suffix('군'))
        .unwrap_or(token)
}

fn is_county(token: &str) -> bool {
    token.ends_with('군')
}

/// Coarse mapping of a street or lot address to its statutory region class as of `as_of`.
///
/// Only the leading province token and the following city/county token are inspected.
/// Returns `None` when the province cannot be recognized.
pub fn classify_region(address: &str, as_of: NaiveDate) -> Option<RegionClass> {
    let tokens = normalize_address(address);
    let first = tokens.first()?;
    let province = province_of(first)?;
    let second = tokens.get(1).map(String::as_str).unwrap_or("");

    let class = match province {
        Province::Seoul => RegionClass::Seoul,
        Province::Incheon => {
            let district = locality(second);
            if INCHEON_EXCLUDED.contains(&district) {
                RegionClass::MetropolitanCity
            } else {
                RegionClass::OvercrowdingControlZone
            }
        }
        Province::MetroCity => {
            if is_county(second) {
                RegionClass::Other
            } else {
                RegionClass::MetropolitanCity
            }
        }
        Province::Sejong => match date_of(SEJONG_OVERCROWDED_FROM) {
            Some(from) if as_of >= from => RegionClass::OvercrowdingControlZone,
            _ => RegionClass::Other,
        },
        Province::Gyeonggi => gyeonggi_class(locality(second), as_of),
        Province::Province => RegionClass::Other,
    };

    Some(class)
}

fn gyeonggi_class(city: &str, as_of: NaiveDate) -> RegionClass {
    if GYEONGGI_OVERCROWDED.contains(&city) {
        return RegionClass::OvercrowdingControlZone;
    }

    GYEONGGI_RECLASSIFIED
        .iter()
        .filter(|(name, _, _)| *name == city)
        .filter_map(|(_, from, class)| date_of(*from).map(|from| (from, *class)))
        .filter(|(from, _)| *from <= as_of)
        .max_by_key(|(from, _)| *from)
        .map(|(_, class)| class)
        .unwrap_or(RegionClass::Other)
}
