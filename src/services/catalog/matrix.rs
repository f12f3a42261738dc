//! Pure combinatorics for the variant matrix.
//!
//! Everything here is side-effect free: the service layer loads option
//! values, calls into this module to expand the matrix and price each
//! combination, and persists the result.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Separator for canonical keys. UUIDs never contain `|`, so keys are
/// unambiguous without escaping.
const KEY_SEPARATOR: &str = "|";

/// One admissible value on an axis, carrying the display label the pricing
/// rule inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisValue {
    pub id: Uuid,
    pub label: String,
}

/// One option's contribution to the matrix: the option and its visible
/// values, in display order.
#[derive(Debug, Clone)]
pub struct OptionAxis {
    pub option_id: Uuid,
    pub values: Vec<AxisValue>,
}

/// A single cell of the matrix: exactly one value per axis, in axis order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub values: Vec<AxisValue>,
}

impl Combination {
    pub fn value_ids(&self) -> Vec<Uuid> {
        self.values.iter().map(|v| v.id).collect()
    }

    /// Canonical key of this combination; order-independent.
    pub fn canonical_key(&self) -> String {
        canonical_key(&self.value_ids())
    }
}

/// Canonical form of a value-id set: the ids rendered as strings, sorted,
/// and joined. Two combinations with the same members in any order
/// canonicalize identically.
pub fn canonical_key(value_ids: &[Uuid]) -> String {
    let mut keys: Vec<String> = value_ids.iter().map(Uuid::to_string).collect();
    keys.sort();
    keys.join(KEY_SEPARATOR)
}

/// Expands the Cartesian product across all axes, in the order the axes are
/// given. An axis with no values annihilates the product; callers drop such
/// axes (or reject the request) before expanding. No axes yields no
/// combinations.
pub fn cartesian_product(axes: &[OptionAxis]) -> Vec<Combination> {
    if axes.is_empty() {
        return Vec::new();
    }

    let mut combos: Vec<Vec<AxisValue>> = vec![Vec::with_capacity(axes.len())];
    for axis in axes {
        let mut next = Vec::with_capacity(combos.len() * axis.values.len());
        for partial in &combos {
            for value in &axis.values {
                let mut extended = partial.clone();
                extended.push(value.clone());
                next.push(extended);
            }
        }
        combos = next;
    }

    combos
        .into_iter()
        .map(|values| Combination { values })
        .collect()
}

/// A rule mapping a combination to its price. Injected into the variant
/// service so deployments can swap the placeholder size surcharge for a
/// real pricing scheme.
pub trait PricingRule: Send + Sync {
    fn price_for(&self, base_price: Decimal, combination: &Combination) -> Decimal;
}

/// The observed storefront rule: a fixed surcharge per option value whose
/// display label, case-insensitively trimmed, equals the trigger token.
#[derive(Debug, Clone)]
pub struct SizeSurchargeRule {
    token: String,
    surcharge: Decimal,
}

impl SizeSurchargeRule {
    pub fn new(token: impl Into<String>, surcharge: Decimal) -> Self {
        Self {
            token: token.into(),
            surcharge,
        }
    }
}

impl Default for SizeSurchargeRule {
    fn default() -> Self {
        Self::new("L", dec!(1.00))
    }
}

impl PricingRule for SizeSurchargeRule {
    fn price_for(&self, base_price: Decimal, combination: &Combination) -> Decimal {
        let matches = combination
            .values
            .iter()
            .filter(|v| v.label.trim().eq_ignore_ascii_case(&self.token))
            .count();

        let price = base_price + self.surcharge * Decimal::from(matches as u32);
        price.round_dp(2)
    }
}
