use contracts::domain::a004_product::{PriceLevel, ProductPrices};

use super::error::PriceTierViolation;

/// Проверить лестницу цен: retail >= silver >= gold >= platinum
///
/// Возвращает первое нарушение сверху вниз.
pub fn validate(product_code: &str, prices: &ProductPrices) -> Result<(), PriceTierViolation> {
    for pair in PriceLevel::LADDER.windows(2) {
        let (ceiling_level, level) = (pair[0], pair[1]);
        let ceiling = prices.level(ceiling_level);
        let value = prices.level(level);
        if value > ceiling {
            return Err(PriceTierViolation {
                product_code: product_code.to_string(),
                level,
                value,
                ceiling_level,
                ceiling,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(retail: i64, silver: i64, gold: i64, platinum: i64) -> ProductPrices {
        ProductPrices {
            purchase: 0,
            retail,
            silver,
            gold,
            platinum,
        }
    }

    #[test]
    fn test_non_increasing_ladder_passes() {
        assert!(validate("A1", &prices(15000, 14000, 14000, 12000)).is_ok());
        assert!(validate("A1", &ProductPrices::default()).is_ok());
    }

    #[test]
    fn test_silver_above_retail() {
        let err = validate("A1", &prices(15000, 20000, 0, 0)).unwrap_err();
        assert_eq!(err.level, PriceLevel::Silver);
        assert_eq!(err.ceiling_level, PriceLevel::Retail);
        assert_eq!(err.value, 20000);
        assert_eq!(err.ceiling, 15000);
    }

    #[test]
    fn test_first_violation_wins() {
        let err = validate("Z9", &prices(100, 90, 95, 99)).unwrap_err();
        assert_eq!(err.level, PriceLevel::Gold);
        assert_eq!(err.ceiling_level, PriceLevel::Silver);
    }

    #[test]
    fn test_platinum_above_gold() {
        let err = validate("Z9", &prices(100, 90, 80, 85)).unwrap_err();
        assert_eq!(err.level, PriceLevel::Platinum);
        assert_eq!(err.ceiling, 80);
    }
}
