use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::Frequency;

/// One entry of the static series allow-list: a human-meaningful slug mapped
/// to its upstream identifier and default frequency.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesMeta {
    pub slug: String,
    pub name: String,
    pub series_id: String,
    pub frequency: Frequency,
    pub description: Option<String>,
    pub source_url: Option<String>,
}

// Row helper to keep the table readable.
macro_rules! series {
    ($slug:literal, $name:literal, $id:literal, $freq:expr, $desc:literal) => {
        SeriesMeta {
            slug: $slug.to_string(),
            name: $name.to_string(),
            series_id: $id.to_string(),
            frequency: $freq,
            description: Some($desc.to_string()),
            source_url: Some(concat!("https://fred.stlouisfed.org/series/", $id).to_string()),
        }
    };
}

static SERIES: Lazy<Vec<SeriesMeta>> = Lazy::new(|| {
    use Frequency::{Monthly, Quarterly, Weekly};
    vec![
        // ---- Labor market ----
        series!("unemployment_rate", "Unemployment Rate", "UNRATE", Monthly,
                "Civilian unemployment rate, percent"),
        series!("u6_rate", "U-6 Unemployment Rate", "U6RATE", Monthly,
                "Broad unemployment including underemployed"),
        series!("job_openings", "Job Openings (JOLTS)", "JTSJOL", Monthly,
                "Total nonfarm job openings, thousands"),
        series!("nonfarm_payrolls", "Nonfarm Payrolls", "PAYEMS", Monthly,
                "All employees, total nonfarm, thousands"),
        series!("initial_claims", "Initial Jobless Claims", "ICSA", Weekly,
                "Weekly unemployment insurance filings, thousands"),
        series!("continued_claims", "Continued Claims", "CCSA", Weekly,
                "Insured unemployment, thousands"),
        series!("avg_hourly_earnings", "Average Hourly Earnings", "CES0500000003", Monthly,
                "Private-sector average hourly earnings, dollars"),
        series!("labor_force_participation", "Labor Force Participation", "CIVPART", Monthly,
                "Share of working-age population in the labor force"),
        // ---- Prices ----
        series!("cpi", "Consumer Price Index", "CPIAUCSL", Monthly,
                "Headline CPI, all urban consumers, index"),
        series!("core_cpi", "Core CPI", "CPILFESL", Monthly,
                "CPI excluding food and energy, index"),
        // ---- Output ----
        series!("real_gdp", "Real GDP", "GDPC1", Quarterly,
                "Inflation-adjusted GDP, billions of chained dollars"),
        series!("gdp_growth", "Real GDP Growth", "A191RL1Q225SBEA", Quarterly,
                "Quarterly real GDP growth, annualized percent"),
        series!("retail_sales", "Retail Sales", "RSXFS", Monthly,
                "Advance retail sales ex food services, millions"),
        series!("personal_saving_rate", "Personal Saving Rate", "PSAVERT", Monthly,
                "Personal saving as a share of disposable income"),
        // ---- Money & housing ----
        series!("fed_balance_sheet", "Fed Balance Sheet", "WALCL", Weekly,
                "Total Federal Reserve assets, millions"),
        series!("m2", "M2 Money Supply", "M2SL", Monthly,
                "Broad money supply, billions"),
        series!("mortgage_30y", "30-Year Mortgage Rate", "MORTGAGE30US", Weekly,
                "Average 30-year fixed mortgage rate, percent"),
        series!("house_price_index", "Case-Shiller Home Price Index", "CSUSHPINSA", Monthly,
                "US national home price index"),
    ]
});

static SERIES_MAP: Lazy<HashMap<String, usize>> = Lazy::new(|| {
    SERIES
        .iter()
        .enumerate()
        .map(|(idx, meta)| (meta.slug.clone(), idx))
        .collect()
});

pub struct Catalog;

impl Catalog {
    pub fn all() -> &'static [SeriesMeta] {
        &SERIES
    }

    /// O(1) lookup by slug.
    pub fn get(slug: &str) -> Option<&'static SeriesMeta> {
        SERIES_MAP.get(slug).and_then(|&idx| SERIES.get(idx))
    }

    pub fn contains(slug: &str) -> bool {
        SERIES_MAP.contains_key(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_slug() {
        let meta = Catalog::get("unemployment_rate").unwrap();
        assert_eq!(meta.series_id, "UNRATE");
        assert_eq!(meta.frequency, Frequency::Monthly);
    }

    #[test]
    fn unknown_slug_is_rejected() {
        assert!(Catalog::get("GDP_PER_CAPITA").is_none());
        assert!(!Catalog::contains(""));
    }

    #[test]
    fn slugs_are_unique() {
        assert_eq!(SERIES_MAP.len(), SERIES.len());
    }

    #[test]
    fn weekly_series_default_to_weekly_frequency() {
        assert_eq!(Catalog::get("initial_claims").unwrap().frequency, Frequency::Weekly);
        assert_eq!(Catalog::get("fed_balance_sheet").unwrap().frequency, Frequency::Weekly);
    }
}
