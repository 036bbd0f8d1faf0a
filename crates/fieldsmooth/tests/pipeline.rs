use approx::assert_relative_eq;

use fieldsmooth::{
    filter::{filter::kernels::TopHatShape, filter::FilterConfig, BoundaryPolicy, FilterError},
    grid::Grid,
    io::{functional as F, DType, GridFile},
    pipeline::{self, PipelineError, SmoothingFilter},
};

#[test]
fn tophat_scenario_through_files() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let input = tmp_dir.path().join("impulse.json");
    let output = tmp_dir.path().join("smoothed.grid");

    std::fs::write(
        &input,
        r#"{"shape": [5], "spacing": [1.0], "data": [1.0, 0.0, 0.0, 0.0, 0.0]}"#,
    )?;

    pipeline::run(
        &input,
        &output,
        &SmoothingFilter::TopHat { radius: 1.0 },
        &FilterConfig::new(),
        None,
    )?;

    let file = F::read_grid(&output)?;
    let third = 1.0 / 3.0;
    assert_eq!(file.grid.as_slice(), &[third, third, 0.0, 0.0, third]);
    assert_eq!(file.grid.spacing(), vec![1.0]);
    assert_eq!(file.metadata.get("filter").map(String::as_str), Some("tophat"));
    Ok(())
}

#[test]
fn gaussian_3d_keeps_layout_and_mean() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let input = tmp_dir.path().join("field.grid");
    let output = tmp_dir.path().join("field_smooth.json");

    let grid = Grid::<f64, 3>::from_shape_fn([6, 8, 10], [2.0, 1.0, 0.5], |[i, j, k]| {
        ((i * 5 + j * 3 + k) % 7) as f64
    })?;
    let mean = grid.mean();
    F::write_grid(&input, &GridFile::new(grid).with_dtype(DType::F64))?;

    pipeline::run(
        &input,
        &output,
        &SmoothingFilter::Gaussian { sigma: 2.0 },
        &FilterConfig::new(),
        Some(DType::F32),
    )?;

    let file = F::read_grid(&output)?;
    assert_eq!(file.dtype, DType::F32);
    assert_eq!(file.grid.shape(), vec![6, 8, 10]);
    assert_eq!(file.grid.spacing(), vec![2.0, 1.0, 0.5]);
    let smoothed_mean = file.grid.as_slice().iter().sum::<f64>() / file.grid.numel() as f64;
    assert_relative_eq!(smoothed_mean, mean, epsilon = 1e-5);
    Ok(())
}

#[test]
fn every_configuration_keeps_a_constant_field() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let input = tmp_dir.path().join("flat.grid");
    let output = tmp_dir.path().join("flat_out.grid");
    let grid = Grid::<f64, 2>::from_shape_val([9, 7], [1.0, 1.5], 0.75)?;
    F::write_grid(&input, &GridFile::new(grid))?;

    for boundary in [BoundaryPolicy::Periodic, BoundaryPolicy::TruncateRenormalize] {
        for shape in [TopHatShape::Sphere, TopHatShape::Box] {
            let config = FilterConfig::new()
                .with_boundary(boundary)
                .with_tophat_shape(shape);
            for filter in [
                SmoothingFilter::Gaussian { sigma: 1.5 },
                SmoothingFilter::TopHat { radius: 3.0 },
            ] {
                pipeline::run(&input, &output, &filter, &config, None)?;
                let file = F::read_grid(&output)?;
                file.grid
                    .as_slice()
                    .iter()
                    .for_each(|&v| assert_relative_eq!(v, 0.75, epsilon = 1e-12));
            }
        }
    }
    Ok(())
}

#[test]
fn invalid_scale_writes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let input = tmp_dir.path().join("field.json");
    let output = tmp_dir.path().join("out.json");
    std::fs::write(
        &input,
        r#"{"shape": [4, 4], "spacing": [1.0, 1.0], "data": [0,1,2,3,4,5,6,7,8,9,10,11,12,13,14,15]}"#,
    )?;

    let result = pipeline::run(
        &input,
        &output,
        &SmoothingFilter::Gaussian { sigma: -1.0 },
        &FilterConfig::new(),
        None,
    );
    assert!(matches!(
        result,
        Err(PipelineError::Filter(FilterError::InvalidScale(_)))
    ));

    // a radius below the spacing covers no neighbour
    let result = pipeline::run(
        &input,
        &output,
        &SmoothingFilter::TopHat { radius: 0.5 },
        &FilterConfig::new(),
        None,
    );
    assert!(matches!(
        result,
        Err(PipelineError::Filter(FilterError::DegenerateKernel { .. }))
    ));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn missing_input_and_bad_output_are_reported() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let filter = SmoothingFilter::Gaussian { sigma: 1.0 };
    let config = FilterConfig::new();

    let result = pipeline::run(
        tmp_dir.path().join("missing.grid"),
        tmp_dir.path().join("out.grid"),
        &filter,
        &config,
        None,
    );
    assert!(matches!(result, Err(PipelineError::Io(_))));

    let input = tmp_dir.path().join("in.json");
    std::fs::write(&input, r#"{"shape": [3], "spacing": [1.0], "data": [1, 2, 3]}"#)?;
    let output = tmp_dir.path().join("out.csv");
    let result = pipeline::run(&input, &output, &filter, &config, None);
    assert!(matches!(result, Err(PipelineError::Io(_))));
    assert!(!output.exists());
    Ok(())
}
