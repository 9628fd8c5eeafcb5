/// Min-max bounds used to rescale one indicator to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
}

impl ReferenceRange {
    /// Fit a range over a collection of values. `None` when there are no values.
    pub fn fit<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values.into_iter().fold(None, |range, v| match range {
            None => Some(Self { min: v, max: v }),
            Some(r) => Some(Self {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    /// A constant series: every value scales to 0.
    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    /// Linear rescale into the range; degenerate ranges map every value to 0.
    pub fn apply(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        (value - self.min) / (self.max - self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_empty() {
        assert_eq!(ReferenceRange::fit(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_fit_min_max() {
        let range = ReferenceRange::fit(vec![3.0, -1.0, 7.5, 2.0]).unwrap();
        assert_eq!(range.min, -1.0);
        assert_eq!(range.max, 7.5);
    }

    #[test]
    fn test_apply_bounds() {
        let range = ReferenceRange::fit(vec![0.0, 10.0]).unwrap();
        assert_eq!(range.apply(0.0), 0.0);
        assert_eq!(range.apply(10.0), 1.0);
        assert_eq!(range.apply(2.5), 0.25);
    }

    #[test]
    fn test_constant_series_scales_to_zero() {
        let values = vec![4.2, 4.2, 4.2];
        let range = ReferenceRange::fit(values.clone()).unwrap();
        assert!(range.is_degenerate());
        for v in values {
            assert_eq!(range.apply(v), 0.0);
        }
    }

    #[test]
    fn test_single_value_is_degenerate() {
        let range = ReferenceRange::fit(vec![5.33]).unwrap();
        assert!(range.is_degenerate());
        assert_eq!(range.apply(5.33), 0.0);
    }
}
