use strafe_kinematics::*;

fn main() {
    let in_per_tick = 0.003;
    let kinematics_result = MecanumKinematics::new(7.5, 1.2);

    let mut current_pose = Pose2::identity();
    // Every wheel advances 100 ticks per step at 500 ticks/s
    let step_ticks = 100.0;
    let ticks_per_sec = 500.0;
    let num_steps = 10;

    match kinematics_result {
        Ok(kinematics) => {
            println!("Initializing simulation...");
            println!("  {}", kinematics);
            println!("  Initial Pose: {}", current_pose);

            for i in 0..num_steps {
                let wheels = WheelState::splat(DualNum::new([step_ticks, ticks_per_sec]))
                    .map(|w| w * in_per_tick);
                let twist = kinematics.forward(wheels);
                current_pose = current_pose.plus(twist.value());
                let velocity: PoseVelocity2Dual<1> = twist.velocity();
                println!("Step {:>2}: Pose: {}  Velocity: {}", i + 1, current_pose, velocity.value());
            }

            println!("\nSimulation complete.");
            println!("Final Pose: {}", current_pose);
        }
        Err(e) => {
            eprintln!("Failed to initialize kinematics: {}", e);
        }
    }
}
