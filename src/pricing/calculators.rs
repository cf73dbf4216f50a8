//! Core jewelry pricing calculation functions.
//!
//! Pure functions for pricing math - no database access, no logging.
//! Reference data (base metal rate, currency rates) is passed in by the caller;
//! see [`crate::pricing::context`] for where it comes from.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// Currency every conversion rate is expressed against.
pub const REFERENCE_CURRENCY: &str = "INR";

/// Carat grade of pure metal.
pub const PURE_CARAT: Decimal = dec!(24);

/// Legal purity standards for the grades the catalog uses.
///
/// These are hallmark values, not ratios: 22kt is 0.916, not 22/24.
pub const CARAT_PURITY_TABLE: [(Decimal, Decimal); 5] = [
    (dec!(24), dec!(1.0)),
    (dec!(22), dec!(0.916)),
    (dec!(18), dec!(0.75)),
    (dec!(14), dec!(0.595)),
    (dec!(9), dec!(0.39)),
];

/// Round to specified decimal places, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use mishco_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(-2.5), 0), dec!(-3));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// How a purity factor was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuritySource {
    /// Exact match in [`CARAT_PURITY_TABLE`]
    Tabulated,
    /// Untabulated grade inside (0, 24], approximated as `carat / 24`
    Linear,
    /// Zero, negative or above 24; treated as pure metal
    OutOfRange,
}

/// Purity factor together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Purity {
    pub factor: Decimal,
    pub source: PuritySource,
}

/// Resolve a carat grade, reporting which rule applied.
pub fn purity_for(carat_value: Decimal) -> Purity {
    if let Some((_, factor)) = CARAT_PURITY_TABLE
        .iter()
        .find(|(grade, _)| *grade == carat_value)
    {
        return Purity {
            factor: *factor,
            source: PuritySource::Tabulated,
        };
    }

    if carat_value > Decimal::ZERO && carat_value <= PURE_CARAT {
        Purity {
            factor: carat_value / PURE_CARAT,
            source: PuritySource::Linear,
        }
    } else {
        Purity {
            factor: Decimal::ONE,
            source: PuritySource::OutOfRange,
        }
    }
}

/// Map a carat grade to the fraction of pure metal it contains.
pub fn resolve_purity(carat_value: Decimal) -> Decimal {
    purity_for(carat_value).factor
}

/// A currency and its rate against [`REFERENCE_CURRENCY`].
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRate {
    pub code: String,
    pub conversion_rate_to_inr: Decimal,
}

impl CurrencyRate {
    pub fn new(code: impl Into<String>, conversion_rate_to_inr: Decimal) -> Self {
        Self {
            code: code.into(),
            conversion_rate_to_inr,
        }
    }
}

/// Factor that converts an amount in `base` into `target`.
///
/// A missing or zero rate on either side counts as the reference unit.
pub fn conversion_factor(target: Option<&CurrencyRate>, base: Option<&CurrencyRate>) -> Decimal {
    let rate_or_unit = |currency: Option<&CurrencyRate>| {
        currency
            .map(|c| c.conversion_rate_to_inr)
            .filter(|rate| !rate.is_zero())
            .unwrap_or(Decimal::ONE)
    };

    rate_or_unit(target) / rate_or_unit(base)
}

/// Input for a single price calculation.
///
/// Flat charges are in the base currency. `tax_rate` is a fraction
/// (0.03 for 3%) and defaults to zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingInput {
    pub weight_grams: Decimal,
    pub carat_value: Decimal,
    pub base_rate_per_gram: Decimal,
    pub making_charge: Option<Decimal>,
    pub stone_price: Option<Decimal>,
    pub labour_charge: Option<Decimal>,
    pub target_currency: Option<CurrencyRate>,
    pub base_currency: Option<CurrencyRate>,
    pub tax_rate: Decimal,
}

/// Itemized result of [`calculate_price`].
///
/// Monetary fields are rounded to 2 places. `gold_value` through
/// `total_incl_tax` are in `base_currency`; the `*_converted` fields are in
/// `currency`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub carat_value: Decimal,
    pub purity_factor: Decimal,
    pub purity_percentage: Decimal,
    pub weight_grams: Decimal,
    pub base_rate_per_gram: Decimal,
    pub conversion_factor: Decimal,
    pub gold_value: Decimal,
    pub making_charge: Decimal,
    pub stone_price: Decimal,
    pub labour_charge: Decimal,
    pub total_excl_tax: Decimal,
    pub tax: Decimal,
    pub total_incl_tax: Decimal,
    pub total_converted: Decimal,
    pub stone_charge_converted: Decimal,
    pub labour_charge_converted: Decimal,
    pub base_currency: String,
    pub currency: String,
}

/// Calculate the price of one item in the target currency.
///
/// Intermediate values stay unrounded; only the returned fields are rounded.
pub fn calculate_price(input: &PricingInput) -> PriceBreakdown {
    let purity_factor = resolve_purity(input.carat_value);
    let making_charge = input.making_charge.unwrap_or_default();
    let stone_price = input.stone_price.unwrap_or_default();
    let labour_charge = input.labour_charge.unwrap_or_default();

    let gold_value = input.weight_grams * input.base_rate_per_gram * purity_factor;
    let total_excl_tax = gold_value + making_charge + stone_price + labour_charge;
    let tax = total_excl_tax * input.tax_rate;
    let total_incl_tax = total_excl_tax + tax;

    let factor = conversion_factor(input.target_currency.as_ref(), input.base_currency.as_ref());
    let total_converted = total_incl_tax * factor;

    let currency = resolve_code(&[input.target_currency.as_ref(), input.base_currency.as_ref()]);
    let base_currency = resolve_code(&[input.base_currency.as_ref()]);

    PriceBreakdown {
        carat_value: input.carat_value,
        purity_factor,
        purity_percentage: round_money(purity_factor * Decimal::ONE_HUNDRED, 1),
        weight_grams: input.weight_grams,
        base_rate_per_gram: input.base_rate_per_gram,
        conversion_factor: factor,
        gold_value: round_money(gold_value, 2),
        making_charge: round_money(making_charge, 2),
        stone_price: round_money(stone_price, 2),
        labour_charge: round_money(labour_charge, 2),
        total_excl_tax: round_money(total_excl_tax, 2),
        tax: round_money(tax, 2),
        total_incl_tax: round_money(total_incl_tax, 2),
        total_converted: round_money(total_converted, 2),
        stone_charge_converted: round_money(stone_price * factor, 2),
        labour_charge_converted: round_money(labour_charge * factor, 2),
        base_currency,
        currency,
    }
}

/// First non-empty code, else the reference currency.
fn resolve_code(candidates: &[Option<&CurrencyRate>]) -> String {
    candidates
        .iter()
        .flatten()
        .map(|c| c.code.as_str())
        .find(|code| !code.is_empty())
        .unwrap_or(REFERENCE_CURRENCY)
        .to_string()
}

/// Per-carat line of a product listing summary (base currency).
#[derive(Debug, Clone, PartialEq)]
pub struct CaratSummary {
    pub carat_value: Decimal,
    pub purity_factor: Decimal,
    pub gold_value: Decimal,
    pub total_excl_tax: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Summarize a product's price at each carat it is offered in.
///
/// No flat charges apply here. A missing carat list means pure metal only,
/// an empty one yields no lines, and a zero carat is read as 24.
pub fn summarize_carats(
    weight_grams: Decimal,
    base_rate_per_gram: Decimal,
    carat_values: Option<&[Decimal]>,
    tax_rate: Decimal,
) -> Vec<CaratSummary> {
    let pure_only = [PURE_CARAT];
    let carats = carat_values.unwrap_or(&pure_only);

    carats
        .iter()
        .map(|&value| {
            let carat_value = if value.is_zero() { PURE_CARAT } else { value };
            let breakdown = calculate_price(&PricingInput {
                weight_grams,
                carat_value,
                base_rate_per_gram,
                tax_rate,
                ..Default::default()
            });

            CaratSummary {
                carat_value,
                purity_factor: breakdown.purity_factor,
                gold_value: breakdown.gold_value,
                total_excl_tax: breakdown.total_excl_tax,
                tax: breakdown.tax,
                total: breakdown.total_incl_tax,
            }
        })
        .collect()
}

/// Price per gram at a given carat.
#[derive(Debug, Clone, PartialEq)]
pub struct CaratRate {
    pub carat_value: Decimal,
    pub purity_factor: Decimal,
    pub price_per_gram: Decimal,
}

/// Derive per-carat rates from the 24-carat base rate.
///
/// With no carats given, every grade in [`CARAT_PURITY_TABLE`] is listed.
pub fn derive_carat_rates(base_rate_per_gram: Decimal, carat_values: &[Decimal]) -> Vec<CaratRate> {
    let known: Vec<Decimal> = CARAT_PURITY_TABLE.iter().map(|(grade, _)| *grade).collect();
    let carats = if carat_values.is_empty() {
        &known[..]
    } else {
        carat_values
    };

    carats
        .iter()
        .map(|&carat_value| {
            let purity_factor = resolve_purity(carat_value);
            CaratRate {
                carat_value,
                purity_factor,
                price_per_gram: round_money(base_rate_per_gram * purity_factor, 2),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inr() -> CurrencyRate {
        CurrencyRate::new("INR", dec!(1))
    }

    fn usd() -> CurrencyRate {
        CurrencyRate::new("USD", dec!(0.012))
    }

    fn ring_22kt() -> PricingInput {
        PricingInput {
            weight_grams: dec!(10),
            carat_value: dec!(22),
            base_rate_per_gram: dec!(6000),
            making_charge: Some(dec!(1000)),
            stone_price: Some(dec!(500)),
            labour_charge: None,
            target_currency: Some(usd()),
            base_currency: Some(inr()),
            tax_rate: Decimal::ZERO,
        }
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(3));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(2.345), 2), dec!(2.35));
        assert_eq!(round_money(dec!(2.335), 2), dec!(2.34));
    }

    #[test]
    fn test_round_money_negative() {
        assert_eq!(round_money(dec!(-2.5), 0), dec!(-3));
        assert_eq!(round_money(dec!(-1.005), 2), dec!(-1.01));
        assert_eq!(round_money(dec!(-1.234), 2), dec!(-1.23));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
        assert_eq!(round_money(dec!(999999.995), 2), dec!(1000000.00));
    }

    // ==================== purity tests ====================

    #[test]
    fn test_known_grades_return_table_literals() {
        assert_eq!(resolve_purity(dec!(24)), dec!(1.0));
        assert_eq!(resolve_purity(dec!(22)), dec!(0.916));
        assert_eq!(resolve_purity(dec!(18)), dec!(0.75));
        assert_eq!(resolve_purity(dec!(14)), dec!(0.595));
        assert_eq!(resolve_purity(dec!(9)), dec!(0.39));
    }

    #[test]
    fn test_known_grade_matches_regardless_of_scale() {
        let purity = purity_for(dec!(22.00));
        assert_eq!(purity.factor, dec!(0.916));
        assert_eq!(purity.source, PuritySource::Tabulated);
    }

    #[test]
    fn test_untabulated_grades_are_linear() {
        let tolerance = dec!(0.000000001);
        for carat in [dec!(0.5), dec!(1), dec!(10), dec!(12.5), dec!(20), dec!(23.9)] {
            let purity = purity_for(carat);
            assert_eq!(purity.source, PuritySource::Linear);
            assert!((purity.factor - carat / dec!(24)).abs() < tolerance);
        }
    }

    #[test]
    fn test_twenty_carat_is_five_sixths() {
        let factor = resolve_purity(dec!(20));
        assert!((factor - dec!(0.8333333333)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_out_of_range_grades_fall_back_to_pure() {
        for carat in [dec!(0), dec!(-1), dec!(-22), dec!(24.01), dec!(100)] {
            let purity = purity_for(carat);
            assert_eq!(purity.factor, Decimal::ONE);
            assert_eq!(purity.source, PuritySource::OutOfRange);
        }
    }

    // ==================== conversion tests ====================

    #[test]
    fn test_conversion_factor_treats_missing_or_zero_rates_as_unit() {
        assert_eq!(conversion_factor(Some(&usd()), Some(&inr())), dec!(0.012));
        assert_eq!(conversion_factor(Some(&usd()), None), dec!(0.012));
        assert_eq!(
            conversion_factor(Some(&usd()), Some(&CurrencyRate::new("INR", dec!(0)))),
            dec!(0.012)
        );
        assert_eq!(
            conversion_factor(Some(&CurrencyRate::new("XXX", dec!(0))), Some(&inr())),
            dec!(1)
        );
        assert_eq!(conversion_factor(None, None), dec!(1));
    }

    #[test]
    fn test_conversion_factor_between_non_reference_currencies() {
        let eur = CurrencyRate::new("EUR", dec!(0.011));
        let aed = CurrencyRate::new("AED", dec!(0.044));
        assert_eq!(conversion_factor(Some(&aed), Some(&eur)), dec!(4));
    }

    // ==================== calculate_price tests ====================

    #[test]
    fn test_calculate_price_end_to_end_usd() {
        let breakdown = calculate_price(&ring_22kt());

        assert_eq!(breakdown.purity_factor, dec!(0.916));
        assert_eq!(breakdown.gold_value, dec!(54960));
        assert_eq!(breakdown.total_excl_tax, dec!(56460));
        assert_eq!(breakdown.conversion_factor, dec!(0.012));
        assert_eq!(breakdown.total_converted, dec!(677.52));
        assert_eq!(breakdown.tax, dec!(0));
        assert_eq!(breakdown.stone_charge_converted, dec!(6));
        assert_eq!(breakdown.labour_charge_converted, dec!(0));
        assert_eq!(breakdown.purity_percentage, dec!(91.6));
        assert_eq!(breakdown.base_currency, "INR");
        assert_eq!(breakdown.currency, "USD");
    }

    #[test]
    fn test_calculate_price_zero_weight_collapses_to_charges() {
        let input = PricingInput {
            weight_grams: dec!(0),
            carat_value: dec!(22),
            base_rate_per_gram: dec!(6000),
            making_charge: Some(dec!(500)),
            stone_price: Some(dec!(0)),
            labour_charge: Some(dec!(0)),
            target_currency: Some(inr()),
            base_currency: Some(inr()),
            tax_rate: Decimal::ZERO,
        };

        let breakdown = calculate_price(&input);
        assert_eq!(breakdown.gold_value, dec!(0));
        assert_eq!(breakdown.total_excl_tax, dec!(500));
        assert_eq!(breakdown.total_converted, dec!(500));
        assert_eq!(breakdown.currency, "INR");
    }

    #[test]
    fn test_calculate_price_missing_charges_are_zero() {
        let input = PricingInput {
            weight_grams: dec!(2),
            carat_value: dec!(24),
            base_rate_per_gram: dec!(7000),
            ..Default::default()
        };

        let breakdown = calculate_price(&input);
        assert_eq!(breakdown.making_charge, dec!(0));
        assert_eq!(breakdown.stone_price, dec!(0));
        assert_eq!(breakdown.labour_charge, dec!(0));
        assert_eq!(breakdown.total_excl_tax, dec!(14000));
        assert_eq!(breakdown.currency, REFERENCE_CURRENCY);
    }

    #[test]
    fn test_calculate_price_is_idempotent() {
        let input = ring_22kt();
        assert_eq!(calculate_price(&input), calculate_price(&input));
    }

    #[test]
    fn test_calculate_price_monotonic_in_weight() {
        let mut previous = calculate_price(&ring_22kt());
        for weight in [dec!(10.5), dec!(11), dec!(15), dec!(40)] {
            let next = calculate_price(&PricingInput {
                weight_grams: weight,
                ..ring_22kt()
            });
            assert!(next.gold_value > previous.gold_value);
            assert!(next.total_converted > previous.total_converted);
            previous = next;
        }
    }

    #[test]
    fn test_calculate_price_same_currency_is_identity() {
        let input = PricingInput {
            target_currency: Some(inr()),
            ..ring_22kt()
        };

        let breakdown = calculate_price(&input);
        assert_eq!(breakdown.conversion_factor, dec!(1));
        assert_eq!(breakdown.total_converted, breakdown.total_excl_tax);
    }

    #[test]
    fn test_calculate_price_non_positive_base_rate_is_not_rejected() {
        let input = PricingInput {
            base_rate_per_gram: dec!(-100),
            making_charge: None,
            stone_price: None,
            target_currency: Some(inr()),
            ..ring_22kt()
        };

        let breakdown = calculate_price(&input);
        assert_eq!(breakdown.gold_value, dec!(-916));
        assert_eq!(breakdown.total_converted, dec!(-916));
    }

    #[test]
    fn test_calculate_price_applies_configured_tax() {
        let input = PricingInput {
            tax_rate: dec!(0.03),
            target_currency: Some(inr()),
            ..ring_22kt()
        };

        let breakdown = calculate_price(&input);
        assert_eq!(breakdown.total_excl_tax, dec!(56460));
        assert_eq!(breakdown.tax, dec!(1693.80));
        assert_eq!(breakdown.total_incl_tax, dec!(58153.80));
        assert_eq!(breakdown.total_converted, dec!(58153.80));
    }

    #[test]
    fn test_calculate_price_rounds_only_outputs() {
        // 3 * 6001 * 0.916 = 16490.748; with 9 flat the unrounded total is 16499.748
        let input = PricingInput {
            weight_grams: dec!(3),
            carat_value: dec!(22),
            base_rate_per_gram: dec!(6001),
            making_charge: Some(dec!(9)),
            ..Default::default()
        };

        let breakdown = calculate_price(&input);
        assert_eq!(breakdown.gold_value, dec!(16490.75));
        assert_eq!(breakdown.total_excl_tax, dec!(16499.75));
    }

    #[test]
    fn test_calculate_price_currency_falls_back_to_base_code() {
        let input = PricingInput {
            target_currency: None,
            base_currency: Some(CurrencyRate::new("AED", dec!(0.044))),
            ..ring_22kt()
        };
        assert_eq!(calculate_price(&input).currency, "AED");

        let input = PricingInput {
            target_currency: Some(CurrencyRate::new("", dec!(0.012))),
            base_currency: Some(inr()),
            ..ring_22kt()
        };
        assert_eq!(calculate_price(&input).currency, "INR");
    }

    // ==================== summarize_carats tests ====================

    #[test]
    fn test_summarize_carats_applies_tax_per_carat() {
        let summary = summarize_carats(
            dec!(10),
            dec!(6000),
            Some(&[dec!(22), dec!(18)][..]),
            dec!(0.03),
        );

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].gold_value, dec!(54960));
        assert_eq!(summary[0].tax, dec!(1648.80));
        assert_eq!(summary[0].total, dec!(56608.80));
        assert_eq!(summary[1].gold_value, dec!(45000));
        assert_eq!(summary[1].tax, dec!(1350));
        assert_eq!(summary[1].total, dec!(46350));
    }

    #[test]
    fn test_summarize_carats_defaults_to_pure() {
        let summary = summarize_carats(dec!(1), dec!(7500), None, dec!(0));
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].carat_value, dec!(24));
        assert_eq!(summary[0].total, dec!(7500));

        let summary = summarize_carats(dec!(1), dec!(7500), Some(&[dec!(0)][..]), dec!(0));
        assert_eq!(summary[0].carat_value, dec!(24));
    }

    #[test]
    fn test_summarize_carats_empty_list_has_no_lines() {
        assert!(summarize_carats(dec!(1), dec!(7500), Some(&[][..]), dec!(0.03)).is_empty());
    }

    // ==================== derive_carat_rates tests ====================

    #[test]
    fn test_derive_carat_rates_lists_known_grades() {
        let rates = derive_carat_rates(dec!(7000), &[]);
        let carats: Vec<Decimal> = rates.iter().map(|r| r.carat_value).collect();
        assert_eq!(carats, vec![dec!(24), dec!(22), dec!(18), dec!(14), dec!(9)]);
        assert_eq!(rates[0].price_per_gram, dec!(7000));
        assert_eq!(rates[1].price_per_gram, dec!(6412));
        assert_eq!(rates[3].price_per_gram, dec!(4165));
    }

    #[test]
    fn test_derive_carat_rates_for_requested_grades() {
        let rates = derive_carat_rates(dec!(6000), &[dec!(20)]);
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].price_per_gram, dec!(5000));
    }
}
