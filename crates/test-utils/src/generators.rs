//! Test data generators for creating synthetic model-output-like grids.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite. All grids are row-major.

/// Creates a temperature-like grid in Kelvin with noisy trailing digits.
///
/// Values range from approximately 250K to 310K.
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f64 / width.max(1) as f64;
            let y_factor = row as f64 / height.max(1) as f64;
            let noise = simple_hash(col as u32, row as u32, 7) as f64 / u32::MAX as f64;
            data.push(250.0 + x_factor * 30.0 + y_factor * 30.0 + noise * 1e-3);
        }
    }
    data
}

/// Creates a U-component (zonal) velocity grid in m/s, -2 to +2.
pub fn create_u_velocity_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let lat_factor = (row as f64 / height.max(1) as f64 - 0.5) * 2.0;
            let noise = simple_hash(col as u32, row as u32, 1) as f64 / u32::MAX as f64;
            data.push(lat_factor * 2.0 + noise * 1e-4);
        }
    }
    data
}

/// Creates a V-component (meridional) velocity grid in m/s, -1.5 to +1.5.
pub fn create_v_velocity_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let lon_factor = (col as f64 / width.max(1) as f64 - 0.5) * 2.0;
            let noise = simple_hash(col as u32, row as u32, 2) as f64 / u32::MAX as f64;
            data.push(lon_factor * 1.5 + noise * 1e-4);
        }
    }
    data
}

/// Creates a vertical velocity grid: values around 1e-6 m/s with exact
/// zeros along the first row.
///
/// Fixed decimal places wipe this field out; significant figures keep it.
pub fn create_w_velocity_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            if row == 0 {
                data.push(0.0);
                continue;
            }
            let h = simple_hash(col as u32, row as u32, 3) as f64 / u32::MAX as f64;
            data.push((h - 0.5) * 4e-6);
        }
    }
    data
}

/// Creates values spanning many orders of magnitude (1e-8 .. 1e8), with
/// alternating signs.
pub fn create_multiscale_values(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let exponent = (i % 17) as i32 - 8;
            let mantissa = 1.0 + (simple_hash(i as u32, 0, 11) as f64 / u32::MAX as f64) * 8.0;
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            sign * mantissa * 10f64.powi(exponent)
        })
        .collect()
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates a grid with NaN values at specified `(col, row)` positions.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f64> {
    let mut data: Vec<f64> = (0..width * height).map(|i| i as f64 * 0.123456).collect();
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f64::NAN;
        }
    }
    data
}

/// Evenly spaced coordinate values `start, start + step, ...`.
pub fn create_axis(start: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| start + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_temperature_grid() {
        let grid = create_temperature_grid(100, 100);
        assert_eq!(grid.len(), 10000);
        let min = grid.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = grid.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(min >= 250.0);
        assert!(max <= 310.0);
    }

    #[test]
    fn test_w_velocity_has_zero_row_and_tiny_values() {
        let grid = create_w_velocity_grid(8, 4);
        assert!(grid[..8].iter().all(|&v| v == 0.0));
        assert!(grid[8..].iter().all(|&v| v.abs() <= 2e-6));
    }

    #[test]
    fn test_multiscale_values_span_orders_of_magnitude() {
        let values = create_multiscale_values(34);
        let min = values.iter().map(|v| v.abs()).fold(f64::INFINITY, f64::min);
        let max = values.iter().map(|v| v.abs()).fold(0.0, f64::max);
        assert!(min < 1e-7);
        assert!(max >= 1e8);
    }

    #[test]
    fn test_create_grid_with_nans() {
        let grid = create_grid_with_nans(10, 10, &[(5, 5), (0, 0)]);
        assert!(grid[0].is_nan());
        assert!(grid[55].is_nan());
        assert!(!grid[1].is_nan());
    }

    #[test]
    fn test_generators_deterministic() {
        assert_eq!(create_u_velocity_grid(16, 16), create_u_velocity_grid(16, 16));
    }
}
