//! Butcher tableau of the 13-stage Fehlberg 7(8) pair.

pub(super) const STAGES: usize = 13;

/// Stage nodes.
pub(super) const C: [f64; STAGES] = [
    0.0,
    2.0 / 27.0,
    1.0 / 9.0,
    1.0 / 6.0,
    5.0 / 12.0,
    1.0 / 2.0,
    5.0 / 6.0,
    1.0 / 6.0,
    2.0 / 3.0,
    1.0 / 3.0,
    1.0,
    0.0,
    1.0,
];

/// Stage coupling coefficients, lower triangular.
pub(super) const A: [[f64; STAGES - 1]; STAGES] = [
    [0.0; 12],
    [2.0 / 27.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 36.0, 1.0 / 12.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 24.0, 0.0, 1.0 / 8.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [5.0 / 12.0, 0.0, -25.0 / 16.0, 25.0 / 16.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 20.0, 0.0, 0.0, 1.0 / 4.0, 1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [
        -25.0 / 108.0,
        0.0,
        0.0,
        125.0 / 108.0,
        -65.0 / 27.0,
        125.0 / 54.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        31.0 / 300.0,
        0.0,
        0.0,
        0.0,
        61.0 / 225.0,
        -2.0 / 9.0,
        13.0 / 900.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        2.0,
        0.0,
        0.0,
        -53.0 / 6.0,
        704.0 / 45.0,
        -107.0 / 9.0,
        67.0 / 90.0,
        3.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        -91.0 / 108.0,
        0.0,
        0.0,
        23.0 / 108.0,
        -976.0 / 135.0,
        311.0 / 54.0,
        -19.0 / 60.0,
        17.0 / 6.0,
        -1.0 / 12.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        2383.0 / 4100.0,
        0.0,
        0.0,
        -341.0 / 164.0,
        4496.0 / 1025.0,
        -301.0 / 82.0,
        2133.0 / 4100.0,
        45.0 / 82.0,
        45.0 / 164.0,
        18.0 / 41.0,
        0.0,
        0.0,
    ],
    [
        3.0 / 205.0,
        0.0,
        0.0,
        0.0,
        0.0,
        -6.0 / 41.0,
        -3.0 / 205.0,
        -3.0 / 41.0,
        3.0 / 41.0,
        6.0 / 41.0,
        0.0,
        0.0,
    ],
    [
        -1777.0 / 4100.0,
        0.0,
        0.0,
        -341.0 / 164.0,
        4496.0 / 1025.0,
        -289.0 / 82.0,
        2193.0 / 4100.0,
        51.0 / 82.0,
        33.0 / 164.0,
        12.0 / 41.0,
        0.0,
        1.0,
    ],
];

/// Weights of the propagated eighth-order solution.
pub(super) const B: [f64; STAGES] = [
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    34.0 / 105.0,
    9.0 / 35.0,
    9.0 / 35.0,
    9.0 / 280.0,
    9.0 / 280.0,
    0.0,
    41.0 / 840.0,
    41.0 / 840.0,
];

/// Difference between the eighth- and seventh-order weights.
pub(super) const B_ERR: [f64; STAGES] = [
    -41.0 / 840.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    -41.0 / 840.0,
    41.0 / 840.0,
    41.0 / 840.0,
];

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn rows_sum_to_nodes() {
        for (row, c) in A.iter().zip(C) {
            assert_relative_eq!(row.iter().sum::<f64>(), c, epsilon = 1e-14);
        }
    }

    #[test]
    fn quadrature_conditions_hold_to_order_eight() {
        for order in 1..=8 {
            let integral: f64 = B
                .iter()
                .zip(C)
                .map(|(b, c)| b * c.powi(order - 1))
                .sum();
            assert_relative_eq!(integral, 1.0 / f64::from(order), epsilon = 1e-14);
        }
    }

    #[test]
    fn error_weights_are_consistent() {
        assert_relative_eq!(B_ERR.iter().sum::<f64>(), 0.0, epsilon = 1e-15);
    }
}
