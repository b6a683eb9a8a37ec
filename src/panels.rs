//! Ready-made panel configurations mirroring the dashboard's charts.
//!
//! Each preset is plain data: callers can use them as-is or as starting
//! points, and the display layer stays unaware of where the thresholds live.

use crate::engine::classify::ClassificationRule;
use crate::engine::derive::DerivedField;
use crate::panel::{PanelSpec, SeriesRole};

/// Labor-market panel: monthly unemployment joined with job openings and the
/// latest weekly claims print within a 30-day window. Openings and claims
/// are rescaled from thousands to millions; the claims trend is smoothed
/// with a 4-week moving average over the raw weekly series.
pub fn labor_market() -> PanelSpec {
    PanelSpec::new("labor_market", "unemployment_rate")
        .role(SeriesRole::new("unemployment_rate", "unemployment_rate"))
        .role(SeriesRole::new("job_openings", "job_openings").with_scale(0.001))
        .role(SeriesRole::new("initial_claims", "initial_claims").with_scale(0.001))
        .tolerance_days(30)
        .derive(DerivedField::moving_average("claims_4wk", "initial_claims", 4))
        .rule(ClassificationRule::value_above("high_unemployment", "unemployment_rate", 6.0))
        .rule(ClassificationRule::value_below("tight_labor", "unemployment_rate", 4.0))
}

/// Growth-regime panel: quarterly GDP growth with a year-over-year change of
/// real GDP (4 quarters back), tagged `crisis` on contraction and
/// `expansion` above trend.
pub fn growth_regime() -> PanelSpec {
    PanelSpec::new("growth_regime", "gdp_growth")
        .role(SeriesRole::new("gdp_growth", "gdp_growth"))
        .role(SeriesRole::new("real_gdp", "real_gdp"))
        .derive(DerivedField::growth("real_gdp_yoy", "real_gdp", 4))
        .rule(ClassificationRule::value_below("crisis", "gdp_growth", 0.0))
        .rule(ClassificationRule::value_above("expansion", "gdp_growth", 2.5))
}

/// Liquidity panel: weekly Fed balance sheet (millions -> trillions) against
/// monthly M2 (billions -> trillions), ratio derived, decimated to roughly
/// monthly density for rendering.
pub fn liquidity() -> PanelSpec {
    PanelSpec::new("liquidity", "fed_balance_sheet")
        .role(SeriesRole::new("fed_balance_sheet", "fed_balance_sheet").with_scale(1e-6))
        .role(SeriesRole::new("m2", "m2").with_scale(1e-3))
        .tolerance_days(15)
        .derive(DerivedField::ratio("balance_to_m2", "fed_balance_sheet", "m2"))
        .require_derived()
        .decimate(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate_against_the_catalog() {
        labor_market().validate().unwrap();
        growth_regime().validate().unwrap();
        liquidity().validate().unwrap();
    }

    #[test]
    fn labor_market_uses_the_mixed_frequency_window() {
        let panel = labor_market();
        assert_eq!(panel.tolerance_days, 30);
        assert_eq!(panel.base_role, "unemployment_rate");
    }
}
