use serde::Serialize;

/// Final priced result for one ride.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareEstimate {
    pub ride_id: i64,
    pub cost: f64,
}

/// Output row shape: `<ride id>,<cost with 2 decimals>`
#[derive(Debug, Serialize)]
pub struct FareEstimateRow {
    pub ride_id: i64,
    pub cost: String,
}

impl FareEstimate {
    pub fn new(ride_id: i64, cost: f64) -> Self {
        Self { ride_id, cost }
    }

    /// Cost rounded to cents, half away from zero
    pub fn rounded_cost(&self) -> f64 {
        (self.cost * 100.0).round() / 100.0
    }

    pub fn formatted_cost(&self) -> String {
        format!("{:.2}", self.rounded_cost())
    }

    pub fn to_row(&self) -> FareEstimateRow {
        FareEstimateRow {
            ride_id: self.ride_id,
            cost: self.formatted_cost(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_cost() {
        assert_eq!(FareEstimate::new(1, 41.1456).formatted_cost(), "41.15");
        assert_eq!(FareEstimate::new(1, 41.1449).formatted_cost(), "41.14");
        assert_eq!(FareEstimate::new(1, 3.47).formatted_cost(), "3.47");
        assert_eq!(FareEstimate::new(1, 12.0).formatted_cost(), "12.00");
    }

    #[test]
    fn test_to_row() {
        let row = FareEstimate::new(9, 6.349).to_row();
        assert_eq!(row.ride_id, 9);
        assert_eq!(row.cost, "6.35");
    }
}
