use chrono::{Datelike, Month};

use crate::models::Season;

const MONTH_SEASONS: [Season; 12] = [
    Season::Winter,
    Season::Winter,
    Season::Spring,
    Season::Spring,
    Season::Spring,
    Season::Summer,
    Season::Summer,
    Season::Summer,
    Season::Autumn,
    Season::Autumn,
    Season::Autumn,
    Season::Winter,
];

/// Fixed month to season mapping (Dec-Feb winter, Mar-May spring,
/// Jun-Aug summer, Sep-Nov autumn).
pub fn season_of(month: Month) -> Season {
    MONTH_SEASONS[month.number_from_month() as usize - 1]
}

/// Season of any date-like value, e.g. a record timestamp or today's date.
pub fn season_for_date<D: Datelike>(date: &D) -> Season {
    MONTH_SEASONS[date.month0() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_every_month_maps_to_a_season() {
        let expected = [
            (Month::January, Season::Winter),
            (Month::February, Season::Winter),
            (Month::March, Season::Spring),
            (Month::April, Season::Spring),
            (Month::May, Season::Spring),
            (Month::June, Season::Summer),
            (Month::July, Season::Summer),
            (Month::August, Season::Summer),
            (Month::September, Season::Autumn),
            (Month::October, Season::Autumn),
            (Month::November, Season::Autumn),
            (Month::December, Season::Winter),
        ];

        for (month, season) in expected {
            assert_eq!(season_of(month), season, "{:?}", month);
        }
    }

    #[test]
    fn test_season_for_date() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(season_for_date(&date), Season::Winter);

        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        assert_eq!(season_for_date(&date), Season::Autumn);
    }
}
