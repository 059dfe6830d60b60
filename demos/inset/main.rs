//! Roofline inset demo: prints the skeleton and inset contours of a
//! built-in shape.
//!
//! Usage:
//! ```text
//! cargo run --example inset                     # default (framed, 0.5)
//! cargo run --example inset -- l_shape 0.75     # shape and distance
//! cargo run --example inset -- framed 1.5 0.5   # plus a prune height
//! ```
//!
//! Shapes: `square`, `rectangle`, `l_shape`, `framed`.

use roofline::math::Point2;
use roofline::{
    OffsetPolygons2D, PolygonWithHoles, PruneSkeleton2D, RooflineError, StraightSkeleton2D,
};

fn ring(coords: &[(f64, f64)]) -> Vec<Point2> {
    coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
}

fn shape(name: &str) -> Result<PolygonWithHoles, RooflineError> {
    let polygon = match name {
        "square" => PolygonWithHoles::simple(ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)])),
        "rectangle" => {
            PolygonWithHoles::simple(ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 6.0), (0.0, 6.0)]))
        }
        "l_shape" => PolygonWithHoles::simple(ring(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 4.0),
            (0.0, 4.0),
        ])),
        _ => PolygonWithHoles::build(
            ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 6.0), (0.0, 6.0)]),
            vec![ring(&[(4.0, 2.0), (4.0, 4.0), (6.0, 4.0), (6.0, 2.0)])],
        ),
    };
    Ok(polygon?)
}

fn main() -> Result<(), RooflineError> {
    // Default: WARN for everything, INFO for roofline.
    // Override with RUST_LOG env var (e.g. RUST_LOG=roofline=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("roofline=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let name = args.first().map_or("framed", String::as_str);
    let distance = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(0.5);
    let prune_height = args.get(2).and_then(|s| s.parse().ok());

    let polygon = shape(name)?;
    let graph = StraightSkeleton2D::new(&polygon).execute()?;
    let lines = graph.lines();

    println!("shape {name}: area {:.3}", polygon.area());
    println!("skeleton ({} ridges):", lines.skeletons.len());
    for (segment, (h0, h1)) in lines.skeletons.iter().zip(&lines.heights) {
        println!(
            "  ({:.3}, {:.3}) -> ({:.3}, {:.3})  heights {h0:.3} / {h1:.3}",
            segment.start.x, segment.start.y, segment.end.x, segment.end.y
        );
    }

    let contours = OffsetPolygons2D::new(&graph, distance).execute()?;
    println!("inset at {distance} ({} contours):", contours.len());
    for contour in &contours {
        let points: Vec<String> = contour
            .points()
            .iter()
            .map(|p| format!("({:.3}, {:.3})", p.x, p.y))
            .collect();
        println!("  area {:.3}: {}", contour.signed_area(), points.join(" "));
    }

    if let Some(height) = prune_height {
        let kept = PruneSkeleton2D::new(&graph, height).execute();
        println!("pruned below {height}: {} ridges kept", kept.len());
    }
    Ok(())
}
