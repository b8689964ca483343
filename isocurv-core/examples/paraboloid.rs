use isocurv::{
    approximate_hessian, principal_curvatures_iso_surface, problems::test_functions::Paraboloid, Evaluator, Point,
    Sr1Config,
};

fn main() {
    let anchor = Point::from_slice(&[0.0, 0.0, 0.0]);
    let config = Sr1Config::new().with_seed(0).with_random_walk(false);

    let estimate = match approximate_hessian(Paraboloid, &anchor, 0.5, 12, &config) {
        Ok(estimate) => estimate,
        Err(never) => match never {},
    };
    let gradient = match Paraboloid.evaluate(anchor.values(), anchor.shape()) {
        Ok(eval) => eval.gradient,
        Err(never) => match never {},
    };

    match principal_curvatures_iso_surface(&gradient, &estimate.hessian, None, None) {
        Ok(pc) => {
            println!(
                "accepted={} curvatures={:?}",
                estimate.accepted_updates,
                pc.curvatures.as_slice()
            );
            println!("directions={:.3}", pc.directions);
        }
        Err(err) => eprintln!("curvature failed: {err}"),
    }
}
