//! Common test fixtures.
//!
//! Small datasets laid out like ocean model output: a regular `y`/`x` grid
//! with velocity components and potential temperature.

use grid_common::{Dataset, NumericArray};

use crate::generators::{
    create_axis, create_temperature_grid, create_u_velocity_grid, create_v_velocity_grid,
    create_w_velocity_grid,
};

/// Names of the data variables in [`velocity_dataset`].
pub const VELOCITY_VARS: [&str; 4] = ["THETA", "UVEL", "VVEL", "WVEL"];

/// A dataset with coordinates `x`, `y` and data variables `UVEL`, `VVEL`,
/// `WVEL` (float64) and `THETA` (float32).
pub fn velocity_dataset(width: usize, height: usize) -> Dataset {
    let shape = vec![height, width];
    let dims = ["y", "x"];

    let x = NumericArray::coordinate("x", create_axis(-179.875, 0.25, width))
        .with_attribute("units", "degrees_east");
    let y = NumericArray::coordinate("y", create_axis(-89.875, 0.25, height))
        .with_attribute("units", "degrees_north");

    let uvel = NumericArray::new("UVEL", dims, shape.clone(), create_u_velocity_grid(width, height))
        .expect("UVEL shape")
        .with_attribute("units", "m/s");
    let vvel = NumericArray::new("VVEL", dims, shape.clone(), create_v_velocity_grid(width, height))
        .expect("VVEL shape")
        .with_attribute("units", "m/s");
    let wvel = NumericArray::new("WVEL", dims, shape.clone(), create_w_velocity_grid(width, height))
        .expect("WVEL shape")
        .with_attribute("units", "m/s");

    let theta: Vec<f32> = create_temperature_grid(width, height)
        .into_iter()
        .map(|t| (t - 273.15) as f32)
        .collect();
    let theta = NumericArray::new("THETA", dims, shape, theta)
        .expect("THETA shape")
        .with_attribute("units", "degC");

    let mut ds = Dataset::new();
    ds.attributes
        .insert("title".to_string(), "synthetic ocean state".into());
    for coord in [x, y] {
        ds.add_coord(coord).expect("unique coordinate");
    }
    for var in [uvel, vvel, wvel, theta] {
        ds.add_data_var(var).expect("unique data variable");
    }
    ds
}

/// A single float64 temperature array on a `y`/`x` grid.
pub fn temperature_array(width: usize, height: usize) -> NumericArray {
    NumericArray::new(
        "T2M",
        ["y", "x"],
        vec![height, width],
        create_temperature_grid(width, height),
    )
    .expect("T2M shape")
    .with_attribute("units", "K")
}
