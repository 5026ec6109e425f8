use prescribed_motion::{
    Phase, PrescribedTwoAxis, PrescribedTwoAxisConfig, StepOutput, TwoAxisReference,
};
use tracing_subscriber::EnvFilter;
use uom::si::angle::degree;
use uom::si::angular_velocity::degree_per_second;
use uom::si::f64::{Angle, Time};
use uom::si::time::second;

// the reference mechanism: two joints mounted back to back along the mount x axis
const CONFIG: &str = r#"
rot_axis_1: [1.0, 0.0, 0.0]
rot_axis_2: [-1.0, 0.0, 0.0]
max_angular_acceleration: 0.008
offset_position: [0.0, 0.0, 0.25]
"#;

const STEP_SECONDS: f64 = 0.5;

fn main() {
    // RUST_LOG=prescribed_motion=trace shows every phase change
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_target(false)
        .init();

    let config: PrescribedTwoAxisConfig =
        serde_yaml::from_str(CONFIG).expect("demo configuration is well-formed");
    let mut propagator = PrescribedTwoAxis::new(config).expect("demo configuration is valid");

    let reference = TwoAxisReference::at_rest(Angle::new::<degree>(60.), Angle::new::<degree>(60.));

    println!(
        "{:>6}  {:<13} {:>9} {:>10}  sigma_fm",
        "t [s]", "phase", "θ [deg]", "θ̇ [deg/s]"
    );

    let mut step = 0_u32;
    let mut last_phase = Phase::Idle;
    loop {
        let t = f64::from(step) * STEP_SECONDS;
        let output = propagator.update(Time::new::<second>(t), &reference, None);

        if step % 10 == 0 || output.phase != last_phase {
            print_row(t, &output);
        }
        last_phase = output.phase;
        if output.phase == Phase::Settled {
            break;
        }
        step += 1;
    }

    let settled = propagator.last_output();
    println!();
    println!(
        "turned by {:.9} deg, |ω| = {:e} rad/s",
        settled.sigma_fm.rotation_magnitude().get::<degree>(),
        settled.omega_fm_f.norm()
    );
    println!(
        "maneuver took {:.3} s",
        propagator
            .maneuver()
            .map_or(0., |maneuver| maneuver.duration.get::<second>())
    );
}

fn print_row(t: f64, output: &StepOutput) {
    println!(
        "{t:>6.1}  {:<13} {:>9.4} {:>10.5}  {}",
        output.phase.to_string(),
        output.spinning_body.theta.get::<degree>(),
        output.spinning_body.theta_dot.get::<degree_per_second>(),
        output.prescribed.sigma_fm,
    );
}
