use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};

use crate::entities::{
    CostEfficiencyEntry, RefillAnalysis, RefillEvent, ScanEvent, ScheduleGroup, SitePrediction,
};
use crate::utils::days_between;
use crate::value_objects::{ConsumptionTrend, DataQuality, UrgencyTier};

const TREND_MIN_PAIRS: usize = 3;
const TREND_UPPER_RATIO: f64 = 1.15;
const TREND_LOWER_RATIO: f64 = 0.85;
const COST_RANKING_MIN_WASHES: usize = 10;
const COST_RANKING_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSettings {
    pub refill_threshold_litres: f64,
    pub litres_per_wash: f64,
    pub scan_window_days: i64,
    pub horizon_days: f64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            refill_threshold_litres: 200.0,
            litres_per_wash: 5.0,
            scan_window_days: 30,
            horizon_days: 365.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionEstimate {
    /// Recency-weighted rate before the trend multiplier.
    pub base_rate: f64,
    pub daily_consumption: f64,
    pub trend: ConsumptionTrend,
    pub confidence: u8,
    pub data_quality: DataQuality,
    pub valid_pairs: usize,
    pub used_scan_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefillHistory {
    pub avg_interval_days: Option<f64>,
    pub days_since_last_refill: f64,
}

/// Per-day consumption between consecutive refills. `refills` must be sorted by date.
/// Pairs with no elapsed time or no positive consumption are dropped.
pub fn consumption_rates(refills: &[RefillEvent]) -> Vec<f64> {
    refills
        .windows(2)
        .filter_map(|pair| {
            let (previous, current) = (&pair[0], &pair[1]);
            let consumed = previous.resulting_level() - current.starting_level();
            let elapsed_days = days_between(previous.date, current.date);
            if elapsed_days <= 0.0 || consumed <= 0.0 {
                return None;
            }
            let rate = consumed / elapsed_days;
            rate.is_finite().then_some(rate)
        })
        .collect()
}

/// Later pairs weigh more: weight = index + 1.
pub fn weighted_rate(rates: &[f64]) -> Option<f64> {
    if rates.is_empty() {
        return None;
    }
    let (weighted_sum, weight_total) = rates
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum, total), (index, rate)| {
            let weight = (index + 1) as f64;
            (sum + rate * weight, total + weight)
        });
    Some(weighted_sum / weight_total)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation over mean.
pub fn coefficient_of_variation(rates: &[f64]) -> Option<f64> {
    let avg = mean(rates)?;
    if avg <= 0.0 {
        return None;
    }
    let variance = rates.iter().map(|rate| (rate - avg).powi(2)).sum::<f64>() / rates.len() as f64;
    Some(variance.sqrt() / avg)
}

pub fn classify_trend(rates: &[f64]) -> ConsumptionTrend {
    if rates.len() < TREND_MIN_PAIRS {
        return ConsumptionTrend::Stable;
    }
    let split = rates.len() - 2;
    let (Some(recent), Some(earlier)) = (mean(&rates[split..]), mean(&rates[..split])) else {
        return ConsumptionTrend::Stable;
    };
    if earlier <= 0.0 {
        return ConsumptionTrend::Stable;
    }
    if recent > earlier * TREND_UPPER_RATIO {
        ConsumptionTrend::Increasing
    } else if recent < earlier * TREND_LOWER_RATIO {
        ConsumptionTrend::Decreasing
    } else {
        ConsumptionTrend::Stable
    }
}

fn variability_penalty(rates: &[f64]) -> i32 {
    match coefficient_of_variation(rates) {
        Some(cov) if cov > 0.5 => 30,
        Some(cov) if cov > 0.3 => 20,
        Some(cov) if cov > 0.15 => 10,
        _ => 0,
    }
}

fn record_count_penalty(refill_count: usize) -> i32 {
    if refill_count < 3 {
        25
    } else if refill_count < 5 {
        15
    } else if refill_count < 8 {
        5
    } else {
        0
    }
}

/// Daily consumption for one site from its sorted refill history, falling back
/// to recent wash activity when no usable refill pair exists.
pub fn estimate_consumption(
    refills: &[RefillEvent],
    recent_scan_count: usize,
    current_stock: f64,
    settings: &ForecastSettings,
) -> ConsumptionEstimate {
    let rates = consumption_rates(refills);
    let mut confidence: i32 = 100 - record_count_penalty(refills.len());

    let (base_rate, used_scan_fallback) = match weighted_rate(&rates) {
        Some(rate) => {
            confidence -= variability_penalty(&rates);
            (rate, false)
        }
        None => {
            confidence -= 30;
            let window = settings.scan_window_days.max(1) as f64;
            (
                recent_scan_count as f64 / window * settings.litres_per_wash,
                true,
            )
        }
    };

    let trend = classify_trend(&rates);
    if !trend.is_stable() {
        confidence -= 10;
    }
    if current_stock <= 0.0 {
        confidence -= 20;
    }

    ConsumptionEstimate {
        base_rate,
        daily_consumption: base_rate * trend.multiplier(),
        trend,
        confidence: confidence.clamp(40, 100) as u8,
        data_quality: DataQuality::from_valid_pairs(rates.len()),
        valid_pairs: rates.len(),
        used_scan_fallback,
    }
}

/// Days of stock left above the safety threshold at the current burn rate.
pub fn stock_based_days(current_stock: f64, daily_consumption: f64, threshold: f64) -> Option<f64> {
    if daily_consumption > 0.0 && daily_consumption.is_finite() {
        Some((current_stock - threshold) / daily_consumption)
    } else {
        None
    }
}

pub fn history_based_days(history: &RefillHistory) -> Option<f64> {
    history
        .avg_interval_days
        .map(|interval| interval - history.days_since_last_refill)
}

/// Blended days until the next refill, within `[0, horizon_days]`.
pub fn predict_refill(
    estimate: &ConsumptionEstimate,
    current_stock: f64,
    history: &RefillHistory,
    settings: &ForecastSettings,
) -> f64 {
    let primary = stock_based_days(
        current_stock,
        estimate.daily_consumption,
        settings.refill_threshold_litres,
    );
    let secondary = history_based_days(history);
    let (primary_weight, secondary_weight) = if estimate.valid_pairs >= TREND_MIN_PAIRS {
        (0.8, 0.2)
    } else {
        (0.5, 0.5)
    };
    let blended = match (primary, secondary) {
        (Some(primary), Some(secondary)) => primary * primary_weight + secondary * secondary_weight,
        (Some(primary), None) => primary,
        (None, Some(secondary)) => secondary,
        (None, None) => settings.horizon_days,
    };
    if blended.is_nan() {
        return settings.horizon_days;
    }
    blended.clamp(0.0, settings.horizon_days)
}

fn refill_history(refills: &[RefillEvent], now: DateTime<Utc>) -> RefillHistory {
    let gaps: Vec<f64> = refills
        .windows(2)
        .map(|pair| days_between(pair[0].date, pair[1].date))
        .collect();
    let days_since_last_refill = refills
        .last()
        .map(|last| days_between(last.date, now))
        .unwrap_or_default();
    RefillHistory {
        avg_interval_days: mean(&gaps),
        days_since_last_refill,
    }
}

fn predict_site(
    site: &str,
    refills: &[RefillEvent],
    scans: &[&ScanEvent],
    now: DateTime<FixedOffset>,
    settings: &ForecastSettings,
) -> Option<SitePrediction> {
    let last = refills.last()?;
    let now_utc = now.with_timezone(&Utc);
    let window_start = now_utc - Duration::days(settings.scan_window_days);
    let recent_scans = scans
        .iter()
        .filter(|scan| scan.timestamp > window_start)
        .count();

    let current_stock = last.resulting_level();
    let estimate = estimate_consumption(refills, recent_scans, current_stock, settings);
    let history = refill_history(refills, now_utc);
    let days_until_refill = predict_refill(&estimate, current_stock, &history, settings);
    let urgency = UrgencyTier::classify(days_until_refill);

    let total_cost: f64 = refills.iter().map(|refill| refill.total_ex_gst).sum();
    let delivered: Vec<f64> = refills.iter().map(|refill| refill.delivered_litres).collect();
    let total_washes = scans.len();
    let cost_per_wash = if total_washes > 0 {
        total_cost / total_washes as f64
    } else {
        0.0
    };
    let avg_washes_per_refill = (total_washes as f64 / refills.len() as f64).round();

    Some(SitePrediction {
        site: site.to_string(),
        customer: last.customer.clone(),
        current_stock,
        daily_consumption: estimate.daily_consumption,
        trend: estimate.trend,
        days_until_refill,
        predicted_refill_date: now.date_naive() + Duration::days(days_until_refill.floor() as i64),
        urgency,
        confidence: estimate.confidence,
        avg_refill_interval_days: history.avg_interval_days,
        avg_refill_volume: mean(&delivered).unwrap_or_default(),
        total_washes,
        total_cost,
        cost_per_wash,
        data_quality: estimate.data_quality,
        valid_consumption_pairs: estimate.valid_pairs,
        refill_count: refills.len(),
        avg_washes_per_refill,
        last_refill_date: last.date,
    })
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Sites that need planning in the same ISO week, for combined delivery runs.
pub fn schedule_groups(predictions: &[SitePrediction]) -> Vec<ScheduleGroup> {
    let mut weeks: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
    for prediction in predictions
        .iter()
        .filter(|prediction| prediction.urgency.needs_refill_planning())
    {
        weeks
            .entry(week_start(prediction.predicted_refill_date))
            .or_default()
            .push(prediction.site.clone());
    }
    weeks
        .into_iter()
        .filter(|(_, sites)| sites.len() > 1)
        .map(|(week_of, sites)| ScheduleGroup { week_of, sites })
        .collect()
}

pub fn cost_efficiency(predictions: &[SitePrediction]) -> Vec<CostEfficiencyEntry> {
    let mut ranked: Vec<CostEfficiencyEntry> = predictions
        .iter()
        .filter(|prediction| prediction.total_washes > COST_RANKING_MIN_WASHES)
        .map(|prediction| CostEfficiencyEntry {
            site: prediction.site.clone(),
            cost_per_wash: prediction.cost_per_wash,
            total_washes: prediction.total_washes,
        })
        .collect();
    ranked.sort_by(|a, b| a.cost_per_wash.total_cmp(&b.cost_per_wash));
    ranked.truncate(COST_RANKING_LIMIT);
    ranked
}

/// Forecast every site that has at least one refill on record.
pub fn analyze_refills(
    refills: &[RefillEvent],
    scans: &[ScanEvent],
    now: DateTime<FixedOffset>,
    settings: &ForecastSettings,
) -> RefillAnalysis {
    let mut refills_by_site: BTreeMap<&str, Vec<RefillEvent>> = BTreeMap::new();
    for refill in refills.iter().filter(|refill| !refill.site.trim().is_empty()) {
        refills_by_site
            .entry(refill.site.as_str())
            .or_default()
            .push(refill.clone());
    }

    let mut scans_by_site: HashMap<&str, Vec<&ScanEvent>> = HashMap::new();
    for scan in scans {
        scans_by_site
            .entry(scan.site_name.as_str())
            .or_default()
            .push(scan);
    }

    let mut predictions: Vec<SitePrediction> = refills_by_site
        .into_iter()
        .filter_map(|(site, mut site_refills)| {
            site_refills.sort_by_key(|refill| refill.date);
            let site_scans = scans_by_site.get(site).map(Vec::as_slice).unwrap_or(&[]);
            predict_site(site, &site_refills, site_scans, now, settings)
        })
        .collect();
    predictions.sort_by(|a, b| {
        a.urgency
            .cmp(&b.urgency)
            .then(a.days_until_refill.total_cmp(&b.days_until_refill))
            .then_with(|| a.site.cmp(&b.site))
    });

    let critical_sites = predictions
        .iter()
        .filter(|prediction| prediction.urgency == UrgencyTier::Critical)
        .count();
    let warning_sites = predictions
        .iter()
        .filter(|prediction| prediction.urgency == UrgencyTier::Warning)
        .count();

    RefillAnalysis {
        generated_at: now.with_timezone(&Utc),
        schedule_groups: schedule_groups(&predictions),
        cost_efficiency: cost_efficiency(&predictions),
        total_sites: predictions.len(),
        critical_sites,
        warning_sites,
        predictions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).single().expect("valid date") + Duration::days(day)
    }

    fn refill(site: &str, day: i64, delivered: f64, start: Option<f64>, new_total: f64) -> RefillEvent {
        RefillEvent {
            site: site.to_string(),
            customer: "Acme Transport".to_string(),
            date: at(day),
            delivered_litres: delivered,
            start_litres: start,
            new_total_litres: new_total,
            total_ex_gst: delivered * 2.0,
            product_name: None,
        }
    }

    fn scan(site: &str, day: i64) -> ScanEvent {
        ScanEvent {
            vehicle_ref: "V-1".to_string(),
            site_ref: "S-1".to_string(),
            site_name: site.to_string(),
            timestamp: at(day),
        }
    }

    fn utc(value: DateTime<Utc>) -> DateTime<FixedOffset> {
        value.fixed_offset()
    }

    #[test]
    fn two_refills_without_scans_forecast_attention() {
        let refills = vec![
            refill("Wacol", 0, 1000.0, None, 1000.0),
            refill("Wacol", 10, 800.0, Some(150.0), 800.0),
        ];
        let settings = ForecastSettings::default();

        let estimate = estimate_consumption(&refills, 0, 800.0, &settings);
        assert_eq!(estimate.valid_pairs, 1);
        assert!((estimate.daily_consumption - 85.0).abs() < 1e-9);
        assert_eq!(estimate.confidence, 75);
        assert_eq!(estimate.trend, ConsumptionTrend::Stable);
        assert_eq!(estimate.data_quality, DataQuality::Fair);

        let primary = stock_based_days(800.0, estimate.daily_consumption, 200.0).expect("primary");
        assert!((primary - 600.0 / 85.0).abs() < 1e-9);
        assert_eq!(UrgencyTier::classify(primary), UrgencyTier::Attention);

        let analysis = analyze_refills(&refills, &[], utc(at(10)), &settings);
        assert_eq!(analysis.total_sites, 1);
        let prediction = &analysis.predictions[0];
        // 0.5 * 7.06 + 0.5 * (10 - 0)
        assert!((prediction.days_until_refill - (0.5 * primary + 5.0)).abs() < 1e-9);
        assert_eq!(prediction.urgency, UrgencyTier::Attention);
        assert_eq!(prediction.current_stock, 800.0);
        assert_eq!(prediction.total_washes, 0);
        assert_eq!(prediction.cost_per_wash, 0.0);
        assert_eq!(prediction.avg_washes_per_refill, 0.0);
        assert_eq!(prediction.predicted_refill_date, at(18).date_naive());
    }

    #[test]
    fn rate_is_positive_and_finite_for_consuming_sequences() {
        let mut refills = Vec::new();
        let mut level = 1200.0;
        for (index, used) in [300.0, 450.0, 120.0, 980.0, 15.0].iter().enumerate() {
            let start = level - used;
            refills.push(refill("Eagle Farm", index as i64 * 3, 600.0, Some(start), start + 600.0));
            level = start + 600.0;
        }
        let estimate = estimate_consumption(&refills, 0, level, &ForecastSettings::default());
        assert_eq!(estimate.valid_pairs, 4);
        assert!(estimate.daily_consumption > 0.0);
        assert!(estimate.daily_consumption.is_finite());
    }

    #[test]
    fn recent_pairs_weigh_more() {
        let rate = weighted_rate(&[10.0, 20.0]).expect("rate");
        assert!((rate - (10.0 + 40.0) / 3.0).abs() < 1e-9);
        assert_eq!(weighted_rate(&[]), None);
    }

    #[test]
    fn trend_compares_last_two_rates_with_earlier_ones() {
        assert_eq!(classify_trend(&[10.0, 10.0]), ConsumptionTrend::Stable);
        assert_eq!(classify_trend(&[10.0, 12.0, 12.0]), ConsumptionTrend::Increasing);
        assert_eq!(classify_trend(&[10.0, 8.0, 8.0]), ConsumptionTrend::Decreasing);
        assert_eq!(classify_trend(&[10.0, 11.0, 11.0]), ConsumptionTrend::Stable);
    }

    #[test]
    fn scan_fallback_when_no_valid_pairs() {
        let refills = vec![refill("Wacol", 0, 500.0, None, 900.0)];
        let estimate = estimate_consumption(&refills, 60, 900.0, &ForecastSettings::default());
        assert!(estimate.used_scan_fallback);
        assert!((estimate.daily_consumption - 10.0).abs() < 1e-9);
        // 100 - 25 (one record) - 30 (fallback)
        assert_eq!(estimate.confidence, 45);
        assert_eq!(estimate.data_quality, DataQuality::Limited);
    }

    /// Seeded refill history with random gaps and start levels, some missing.
    fn noisy_history(seed: u64, len: usize) -> Vec<RefillEvent> {
        let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        let mut next = move |bound: u64| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 33) % bound
        };
        let mut day = 0;
        (0..len)
            .map(|_| {
                day += next(21) as i64;
                let delivered = next(2_001) as f64;
                let start = match next(4) {
                    0 => None,
                    _ => Some(next(3_000) as f64),
                };
                let new_total = start.unwrap_or(0.0) + delivered * (next(3) as f64) / 2.0;
                refill("Wacol", day, delivered, start, new_total)
            })
            .collect()
    }

    #[test]
    fn confidence_never_drops_below_floor() {
        let settings = ForecastSettings::default();
        let assert_bounded = |estimate: &ConsumptionEstimate, label: &str| {
            assert!(
                (40..=100).contains(&estimate.confidence),
                "{label}: confidence {}",
                estimate.confidence
            );
            assert!(
                estimate.daily_consumption.is_finite() && estimate.daily_consumption >= 0.0,
                "{label}: rate {}",
                estimate.daily_consumption
            );
        };

        for seed in 0..200u64 {
            let refills = noisy_history(seed, (seed % 12) as usize);
            for (scans, stock) in [(0, 0.0), (0, 900.0), (45, 0.0), (500, -50.0)] {
                let estimate = estimate_consumption(&refills, scans, stock, &settings);
                assert_bounded(&estimate, &format!("seed {seed} scans {scans} stock {stock}"));
                let history = refill_history(&refills, at(400));
                let days = predict_refill(&estimate, stock, &history, &settings);
                assert!((0.0..=settings.horizon_days).contains(&days), "seed {seed}: {days}");
            }
        }

        // Scan fallback with one record and no stock: 100 - 25 - 30 - 20.
        let single = vec![refill("Wacol", 0, 500.0, None, 500.0)];
        let fallback = estimate_consumption(&single, 0, 0.0, &settings);
        assert!(fallback.used_scan_fallback);
        assert_eq!(fallback.confidence, 40);

        // High variability, unstable trend and zero stock all at once.
        let erratic = vec![
            refill("Wacol", 0, 1000.0, None, 1000.0),
            refill("Wacol", 1, 100.0, Some(10.0), 110.0),
            refill("Wacol", 2, 100.0, Some(100.0), 200.0),
            refill("Wacol", 30, 100.0, Some(190.0), 290.0),
        ];
        let rates = consumption_rates(&erratic);
        assert!(coefficient_of_variation(&rates).expect("cov") > 0.5);
        let estimate = estimate_consumption(&erratic, 0, 0.0, &settings);
        assert_bounded(&estimate, "erratic");
        assert_eq!(estimate.confidence, 40);
    }

    #[test]
    fn missing_estimates_fall_back_to_horizon() {
        let estimate = estimate_consumption(&[], 0, 500.0, &ForecastSettings::default());
        let history = RefillHistory {
            avg_interval_days: None,
            days_since_last_refill: 0.0,
        };
        let days = predict_refill(&estimate, 500.0, &history, &ForecastSettings::default());
        assert_eq!(days, 365.0);
    }

    #[test]
    fn overdue_sites_floor_at_zero() {
        let estimate = estimate_consumption(
            &[
                refill("Wacol", 0, 1000.0, None, 1000.0),
                refill("Wacol", 10, 800.0, Some(150.0), 950.0),
            ],
            0,
            150.0,
            &ForecastSettings::default(),
        );
        let history = RefillHistory {
            avg_interval_days: Some(10.0),
            days_since_last_refill: 40.0,
        };
        let days = predict_refill(&estimate, 150.0, &history, &ForecastSettings::default());
        assert_eq!(days, 0.0);
        assert_eq!(UrgencyTier::classify(days), UrgencyTier::Critical);
    }

    #[test]
    fn urgent_sites_in_the_same_week_are_grouped() {
        let refills = vec![
            refill("Wacol", 0, 1000.0, None, 1000.0),
            refill("Wacol", 10, 800.0, Some(150.0), 300.0),
            refill("Rocklea", 0, 1000.0, None, 1000.0),
            refill("Rocklea", 10, 800.0, Some(150.0), 320.0),
            refill("Pinkenba", 0, 1000.0, None, 1000.0),
            refill("Pinkenba", 1, 100.0, Some(990.0), 5000.0),
        ];
        let analysis = analyze_refills(&refills, &[], utc(at(10)), &ForecastSettings::default());
        assert_eq!(analysis.total_sites, 3);
        assert_eq!(analysis.predictions.last().map(|p| p.site.as_str()), Some("Pinkenba"));
        assert_eq!(analysis.schedule_groups.len(), 1);
        let group = &analysis.schedule_groups[0];
        assert_eq!(group.week_of.weekday(), chrono::Weekday::Mon);
        assert_eq!(group.sites.len(), 2);
        assert!(analysis
            .predictions
            .windows(2)
            .all(|pair| pair[0].urgency <= pair[1].urgency));
    }

    #[test]
    fn cost_ranking_needs_more_than_ten_washes() {
        let refills = vec![
            refill("Wacol", 0, 1000.0, None, 1000.0),
            refill("Rocklea", 0, 1000.0, None, 1000.0),
        ];
        let mut scans: Vec<ScanEvent> = (0..11).map(|day| scan("Wacol", day)).collect();
        scans.extend((0..10).map(|day| scan("Rocklea", day)));
        let analysis = analyze_refills(&refills, &scans, utc(at(12)), &ForecastSettings::default());
        assert_eq!(analysis.cost_efficiency.len(), 1);
        assert_eq!(analysis.cost_efficiency[0].site, "Wacol");
        assert!((analysis.cost_efficiency[0].cost_per_wash - 2000.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn washes_per_refill_averages_over_refill_count() {
        let refills = vec![
            refill("Wacol", 0, 1000.0, None, 1000.0),
            refill("Wacol", 4, 400.0, Some(700.0), 1100.0),
            refill("Wacol", 8, 400.0, Some(800.0), 1200.0),
        ];
        let scans: Vec<ScanEvent> = (0..10).map(|day| scan("Wacol", day)).collect();
        let analysis = analyze_refills(&refills, &scans, utc(at(10)), &ForecastSettings::default());
        let prediction = &analysis.predictions[0];
        assert_eq!(prediction.total_washes, 10);
        assert_eq!(prediction.refill_count, 3);
        // 10 / 3 rounds to 3
        assert_eq!(prediction.avg_washes_per_refill, 3.0);
    }
}
