use stackflat::{FlattenConfig, Flattener, InterpolationMethod, Stack, ThresholdWindow};
use std::error::Error;

/// Synthetic 64x64x24 stack with a bright sheet bending from slice 6 to slice 18.
fn bent_sheet(w: usize, h: usize, n: usize) -> Result<Stack, Box<dyn Error>> {
    let plane = w * h;
    let mut data = vec![0.0f32; plane * n];
    for y in 0..h {
        for x in 0..w {
            let surface = 6.0 + 12.0 * (x as f32 / (w - 1) as f32).powi(2);
            for s in 1..=n {
                let dz = s as f32 - surface;
                data[(s - 1) * plane + x + y * w] = 200.0 * (-dz * dz).exp();
            }
        }
    }
    Ok(Stack::new(w, h, n, data)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    let method = match args.get(1).map(String::as_str) {
        Some("cubic") => InterpolationMethod::MonotoneCubic,
        Some("linear") | None => InterpolationMethod::Linear,
        Some(other) => {
            eprintln!("Usage: {} [linear|cubic] (got {other})", args[0]);
            std::process::exit(2);
        }
    };

    let stack = bent_sheet(64, 64, 24)?;
    let flattener = Flattener::with_config(FlattenConfig {
        interpolation: method,
        threshold: ThresholdWindow::new(20.0, 200.0),
        smoothing_sigma: 2.0,
        emit_height_map: true,
    });

    let out = flattener.flatten(&stack)?;
    let summary = &out.summary;
    println!(
        "{} interpolation: {} -> {} slices, surface moved to slice {}",
        method.label(),
        stack.n_slices(),
        summary.output_slices,
        summary.target_height
    );
    if let Some([lo, hi]) = summary.height_range {
        println!("Estimated surface depth range: {lo:.2} .. {hi:.2}");
    }
    println!(
        "Voxels written {} / dropped {}",
        summary.resample.written, summary.resample.dropped
    );

    let target = summary.target_height as usize;
    let row: Vec<String> = (0..64)
        .step_by(8)
        .map(|x| format!("{:.0}", out.stack.get(x, 32, target)))
        .collect();
    println!("Flattened slice {target}, row 32: {}", row.join(" "));
    Ok(())
}
