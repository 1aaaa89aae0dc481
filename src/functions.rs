/// Largest `f64` strictly below 1.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Always 1, for bias-like neurons
pub fn constant(_input: f64) -> f64 {
    1.0
}

/// The identity function
pub fn identity(input: f64) -> f64 {
    input
}

/// 1 above the threshold, -1 otherwise
pub fn step(input: f64, threshold: f64) -> f64 {
    if input > threshold {
        1.0
    } else {
        -1.0
    }
}

/// The logistic function, kept inside the open interval (0, 1) even when `e^-x` saturates.
pub fn sigmoid(input: f64) -> f64 {
    (1.0 / (1.0 + (-input).exp())).clamp(f64::MIN_POSITIVE, BELOW_ONE)
}

/// The hyperbolic tangent function
pub fn tanh(input: f64) -> f64 {
    input.tanh()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_stays_in_open_interval() {
        for x in [-1e6, -800.0, -40.0, -1.0, 0.0, 1.0, 40.0, 800.0, 1e6] {
            let y = sigmoid(x);
            assert!(y > 0.0 && y < 1.0, "sigmoid({x}) = {y}");
        }
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn sigmoid_is_monotonic() {
        let values: Vec<f64> = (-50..=50).map(|x| sigmoid(x as f64)).collect();
        assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn step_uses_strict_threshold() {
        assert_eq!(step(0.0, 0.0), -1.0);
        assert_eq!(step(0.1, 0.0), 1.0);
        assert_eq!(step(0.3, 0.5), -1.0);
        assert_eq!(step(-0.3, -0.5), 1.0);
    }

    #[test]
    fn constant_ignores_input() {
        assert_eq!(constant(-3.0), 1.0);
        assert_eq!(constant(f64::INFINITY), 1.0);
    }
}
