//! Charge statistics and cost estimate

use chargeward_api::{ChargeDetails, ChargeSummary, ChargingState};

/// Summarize charge details for a report
///
/// Session figures (range at session start, energy and cost) are only
/// meaningful while charging or just after completing, and are left out
/// otherwise.
pub fn summarize_charge(
    details: &ChargeDetails,
    state: &ChargingState,
    energy_rate_per_kwh: f64,
) -> ChargeSummary {
    let theoretical_max_range = (details.battery_level > 0.0)
        .then(|| details.battery_range * 100.0 / details.battery_level);

    let in_session = state.is_charging_or_complete();
    let charging = state.as_str() == ChargingState::CHARGING;

    ChargeSummary {
        battery_level: details.battery_level,
        battery_range: details.battery_range,
        theoretical_max_range,
        charge_limit_soc: details.charge_limit_soc,
        range_at_session_start: in_session
            .then(|| details.battery_range - details.charge_miles_added_ideal),
        energy_added_kwh: in_session.then_some(details.charge_energy_added),
        energy_cost: in_session.then(|| details.charge_energy_added * energy_rate_per_kwh),
        energy_rate_per_kwh,
        charger_actual_current: charging.then_some(details.charger_actual_current),
        charger_voltage: charging.then_some(details.charger_voltage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> ChargeDetails {
        ChargeDetails {
            battery_level: 50.0,
            battery_range: 150.0,
            charge_limit_soc: 90,
            charge_rate: 30.0,
            charge_energy_added: 20.0,
            charge_miles_added_ideal: 60.0,
            charger_actual_current: 32.0,
            charger_voltage: 240.0,
        }
    }

    #[test]
    fn charging_summary_includes_session_figures() {
        let summary = summarize_charge(&details(), &"Charging".into(), 0.13);

        assert_eq!(summary.theoretical_max_range, Some(300.0));
        assert_eq!(summary.range_at_session_start, Some(90.0));
        assert_eq!(summary.energy_added_kwh, Some(20.0));
        assert!((summary.energy_cost.unwrap() - 2.6).abs() < 1e-9);
        assert_eq!(summary.charger_actual_current, Some(32.0));
        assert_eq!(summary.charger_voltage, Some(240.0));
    }

    #[test]
    fn complete_summary_has_cost_but_no_charger() {
        let summary = summarize_charge(&details(), &"Complete".into(), 0.25);

        assert_eq!(summary.energy_cost, Some(5.0));
        assert_eq!(summary.charger_actual_current, None);
    }

    #[test]
    fn idle_summary_omits_session_figures() {
        let summary = summarize_charge(&details(), &"Disconnected".into(), 0.13);

        assert_eq!(summary.range_at_session_start, None);
        assert_eq!(summary.energy_cost, None);
        assert_eq!(summary.charge_limit_soc, 90);
    }

    #[test]
    fn empty_battery_has_no_extrapolated_range() {
        let mut empty = details();
        empty.battery_level = 0.0;
        let summary = summarize_charge(&empty, &"Stopped".into(), 0.13);
        assert_eq!(summary.theoretical_max_range, None);
    }
}
