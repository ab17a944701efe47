use rust_decimal::Decimal;

use crate::room_type::RoomType;

/// Stay subtotal: nightly base price x rooms x nights.
pub fn stay_subtotal(base_price: Decimal, quantity: i32, nights: i64) -> Decimal {
    base_price * Decimal::from(quantity) * Decimal::from(nights)
}

/// Apply the room type's tax percentage, rounded to two decimal places.
pub fn apply_tax(subtotal: Decimal, tax_percent: Decimal) -> Decimal {
    let taxed = subtotal * (Decimal::ONE + tax_percent / Decimal::ONE_HUNDRED);
    taxed.round_dp(2)
}

/// Quote the total amount for a stay on the given room type.
pub fn quote(room: &RoomType, quantity: i32, nights: i64) -> Decimal {
    apply_tax(stay_subtotal(room.base_price, quantity, nights), room.tax_percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stay_subtotal() {
        // 2 rooms x 3 nights at 4500.00/night
        let subtotal = stay_subtotal(Decimal::new(450000, 2), 2, 3);
        assert_eq!(subtotal, Decimal::new(2700000, 2));
    }

    #[test]
    fn test_tax_applied_and_rounded() {
        // 1000.00 + 12.5% = 1125.00
        let total = apply_tax(Decimal::new(100000, 2), Decimal::new(125, 1));
        assert_eq!(total, Decimal::new(112500, 2));
    }

    #[test]
    fn test_zero_tax_is_identity() {
        let subtotal = Decimal::new(999900, 2);
        assert_eq!(apply_tax(subtotal, Decimal::ZERO), subtotal);
    }
}
