//! Closed-form delta of a constant-product LP position.

use crate::domain::DomainError;

/// Delta exposure of a 50/50 constant-product position relative to entry.
///
/// `price_ratio_normalized` is current price over entry price. The closed
/// form is `0.5 * (1 - sqrt(ratio))`: zero at entry, negative as price
/// rises (the pool sheds the appreciating asset), positive as it falls.
///
/// Fails with [`DomainError::NonPositivePrice`] for a non-positive or
/// non-finite ratio — prices are validated upstream, so hitting this is a
/// caller bug rather than a market condition.
pub fn position_delta(price_ratio_normalized: f64) -> Result<f64, DomainError> {
    if !price_ratio_normalized.is_finite() || price_ratio_normalized <= 0.0 {
        return Err(DomainError::NonPositivePrice {
            price: price_ratio_normalized,
        });
    }
    Ok(0.5 * (1.0 - price_ratio_normalized.sqrt()))
}
