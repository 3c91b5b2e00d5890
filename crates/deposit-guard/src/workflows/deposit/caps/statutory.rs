use super::region::RegionClass;
use super::CapTier;
use chrono::NaiveDate;

type Window = ((i32, u32, u32), Option<(i32, u32, u32)>);

/// `(window, [seoul, overcrowding zone, metropolitan city, other])` as
/// `(max_protected_deposit, max_priority_repayment)` in won.
const STATUTORY_WINDOWS: &[(Window, [(u64, u64); 4])] = &[
    (
        ((2010, 7, 26), Some((2013, 12, 31))),
        [
            (75_000_000, 25_000_000),
            (65_000_000, 22_000_000),
            (55_000_000, 19_000_000),
            (40_000_000, 14_000_000),
        ],
    ),
    (
        ((2014, 1, 1), Some((2016, 3, 30))),
        [
            (95_000_000, 32_000_000),
            (80_000_000, 27_000_000),
            (60_000_000, 20_000_000),
            (45_000_000, 15_000_000),
        ],
    ),
    (
        ((2016, 3, 31), Some((2018, 9, 17))),
        [
            (100_000_000, 34_000_000),
            (80_000_000, 27_000_000),
            (60_000_000, 20_000_000),
            (50_000_000, 17_000_000),
        ],
    ),
    (
        ((2018, 9, 18), Some((2021, 5, 10))),
        [
            (110_000_000, 37_000_000),
            (100_000_000, 34_000_000),
            (60_000_000, 20_000_000),
            (50_000_000, 17_000_000),
        ],
    ),
    (
        ((2021, 5, 11), Some((2023, 2, 20))),
        [
            (150_000_000, 50_000_000),
            (130_000_000, 43_000_000),
            (70_000_000, 23_000_000),
            (60_000_000, 20_000_000),
        ],
    ),
    (
        ((2023, 2, 21), None),
        [
            (165_000_000, 55_000_000),
            (145_000_000, 48_000_000),
            (85_000_000, 28_000_000),
            (75_000_000, 25_000_000),
        ],
    ),
];

const REGION_ORDER: [RegionClass; 4] = [
    RegionClass::Seoul,
    RegionClass::OvercrowdingControlZone,
    RegionClass::MetropolitanCity,
    RegionClass::Other,
];

fn date_of((year, month, day): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

pub(super) fn statutory_tiers() -> Vec<CapTier> {
    let mut tiers = Vec::with_capacity(STATUTORY_WINDOWS.len() * REGION_ORDER.len());

    for ((from, to), amounts) in STATUTORY_WINDOWS {
        let Some(effective_from) = date_of(*from) else {
            continue;
        };
        let effective_to = to.and_then(date_of);

        for (region, (max_protected_deposit, max_priority_repayment)) in
            REGION_ORDER.iter().zip(amounts.iter())
        {
            tiers.push(CapTier {
                region: *region,
                effective_from,
                effective_to,
                max_protected_deposit: *max_protected_deposit,
                max_priority_repayment: *max_priority_repayment,
            });
        }
    }

    tiers
}
