//! Built-in reference data: tracked entities, the fallback financial series
//! and the estimated pre-history revenue table.

use crate::{EntityObservation, HistoricalSeries, Ticker, TrackedEntity};

const ENTITIES: [(&str, &str, &str); 5] = [
    ("BLK", "BlackRock Inc.", "#6ea8fe"),
    ("STT", "State Street Corp.", "#fbbf24"),
    ("IVZ", "Invesco Ltd.", "#c084fc"),
    ("BEN", "Franklin Templeton", "#f472b6"),
    ("TROW", "T. Rowe Price", "#34d399"),
];

/// (ticker, year, price, net income, revenue)
const REFERENCE_ROWS: [(&str, i32, f64, f64, f64); 25] = [
    ("BLK", 2021, 727.0, 5.90e9, 19.37e9),
    ("BLK", 2022, 565.0, 5.18e9, 17.87e9),
    ("BLK", 2023, 736.0, 5.50e9, 17.86e9),
    ("BLK", 2024, 1049.0, 6.37e9, 20.41e9),
    ("BLK", 2025, 1056.0, 6.80e9, 21.50e9),
    ("STT", 2021, 93.0, 2.07e9, 11.96e9),
    ("STT", 2022, 78.0, 2.77e9, 12.35e9),
    ("STT", 2023, 77.0, 1.95e9, 11.95e9),
    ("STT", 2024, 98.0, 2.18e9, 12.63e9),
    ("STT", 2025, 132.0, 2.35e9, 13.10e9),
    ("IVZ", 2021, 24.0, 1.39e9, 6.89e9),
    ("IVZ", 2022, 18.0, 0.54e9, 6.05e9),
    ("IVZ", 2023, 17.0, 0.52e9, 5.73e9),
    ("IVZ", 2024, 18.0, 0.58e9, 6.02e9),
    ("IVZ", 2025, 19.0, 0.62e9, 6.20e9),
    ("BEN", 2021, 32.0, 1.83e9, 8.43e9),
    ("BEN", 2022, 25.0, 1.30e9, 8.28e9),
    ("BEN", 2023, 25.0, 0.87e9, 7.85e9),
    ("BEN", 2024, 22.0, 0.95e9, 8.10e9),
    ("BEN", 2025, 21.0, 1.00e9, 8.30e9),
    ("TROW", 2021, 198.0, 3.08e9, 7.67e9),
    ("TROW", 2022, 110.0, 1.55e9, 6.49e9),
    ("TROW", 2023, 109.0, 1.65e9, 6.46e9),
    ("TROW", 2024, 118.0, 1.90e9, 7.08e9),
    ("TROW", 2025, 115.0, 2.00e9, 7.30e9),
];

/// Estimated combined revenue of the tracked entities before real data.
pub const RETRO_REVENUE: [(i32, f64); 25] = [
    (1996, 18.0e9),
    (1997, 20.5e9),
    (1998, 22.0e9),
    (1999, 26.0e9),
    (2000, 28.0e9),
    (2001, 24.0e9),
    (2002, 22.0e9),
    (2003, 25.0e9),
    (2004, 29.0e9),
    (2005, 33.0e9),
    (2006, 38.0e9),
    (2007, 42.0e9),
    (2008, 30.0e9),
    (2009, 32.0e9),
    (2010, 37.0e9),
    (2011, 39.0e9),
    (2012, 42.0e9),
    (2013, 47.0e9),
    (2014, 50.0e9),
    (2015, 52.0e9),
    (2016, 53.0e9),
    (2017, 57.0e9),
    (2018, 55.0e9),
    (2019, 60.0e9),
    (2020, 58.0e9),
];

/// First year covered by [`RETRO_REVENUE`].
pub fn retro_start() -> i32 {
    RETRO_REVENUE[0].0
}

/// Estimated revenue for `year`: the table entry, or the nearest earlier one
/// for years past the end of the table. `None` before the table starts.
pub fn retro_revenue(year: i32) -> Option<f64> {
    RETRO_REVENUE
        .iter()
        .take_while(|(y, _)| *y <= year)
        .last()
        .map(|(_, rev)| *rev)
}

/// The tracked asset managers in display order.
pub fn tracked_entities() -> Vec<TrackedEntity> {
    ENTITIES
        .iter()
        .map(|(ticker, name, color)| TrackedEntity {
            ticker: Ticker::from(*ticker),
            name: (*name).to_string(),
            color: (*color).to_string(),
        })
        .collect()
}

/// Colour for tickers outside the tracked set.
pub const UNTRACKED_COLOR: &str = "#9ca3af";

/// Display details for `ticker`. Untracked tickers are named by their symbol.
pub fn describe(ticker: &Ticker) -> TrackedEntity {
    tracked_entities()
        .into_iter()
        .find(|e| &e.ticker == ticker)
        .unwrap_or_else(|| TrackedEntity {
            ticker: ticker.clone(),
            name: ticker.to_string(),
            color: UNTRACKED_COLOR.to_string(),
        })
}

/// Tickers of [`tracked_entities`].
pub fn tracked_tickers() -> Vec<Ticker> {
    ENTITIES.iter().map(|(t, _, _)| Ticker::from(*t)).collect()
}

/// Static multi-year dataset used whenever real data is unavailable.
pub fn reference_series() -> HistoricalSeries {
    let mut series = HistoricalSeries::new(tracked_tickers());
    for (ticker, year, price, ni, rev) in REFERENCE_ROWS {
        series.insert(year, Ticker::from(ticker), EntityObservation::new(price, ni, rev));
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_series_covers_five_years() {
        let s = reference_series();
        assert_eq!(s.first_year(), Some(2021));
        assert_eq!(s.last_year(), Some(2025));
        assert_eq!(s.len(), 5);
        assert_eq!(s.tickers().len(), 5);
        let row = s.get(2021).unwrap();
        let combined = row.combined_net_income(s.tickers());
        assert!((combined - 14.27e9).abs() < 1.0);
    }

    #[test]
    fn retro_table_lookup() {
        assert_eq!(retro_start(), 1996);
        assert_eq!(retro_revenue(1995), None);
        assert_eq!(retro_revenue(1996), Some(18.0e9));
        assert_eq!(retro_revenue(2008), Some(30.0e9));
        // Past the table the last estimate carries forward.
        assert_eq!(retro_revenue(2022), Some(58.0e9));
    }

    #[test]
    fn entities_have_names_and_colors() {
        let e = tracked_entities();
        assert_eq!(e.len(), 5);
        assert_eq!(e[0].ticker, Ticker::from("BLK"));
        assert!(e.iter().all(|x| x.color.starts_with('#') && !x.name.is_empty()));
    }

    #[test]
    fn describe_known_and_unknown() {
        let trow = describe(&Ticker::from("TROW"));
        assert_eq!(trow.name, "T. Rowe Price");
        assert_eq!(trow.color, "#34d399");
        let other = describe(&Ticker::from("XYZ"));
        assert_eq!(other.name, "XYZ");
        assert_eq!(other.color, UNTRACKED_COLOR);
    }
}
