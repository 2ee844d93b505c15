use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use twin_panel::{app, GaugeId, PanelCommand, PanelConfig, ProcessSetpoints};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Tick twice a second, reproducible sensor noise
    let config = PanelConfig::builder().seed(2024).build();

    let (sender, receiver) = mpsc::channel();

    // Operator thread: wander the setpoints and occasionally retune a gauge
    thread::spawn(move || {
        let mut rng = rand::rng();
        let setup = [
            PanelCommand::AddComponent("H2O".to_string()),
            PanelCommand::SetShare("H2O".to_string(), 0.3),
            PanelCommand::AddComponent("CO2".to_string()),
            PanelCommand::SetShare("CO2".to_string(), 0.5),
        ];
        if setup.into_iter().any(|cmd| sender.send(cmd).is_err()) {
            return;
        }

        let mut setpoints = ProcessSetpoints::default();
        for round in 0u64.. {
            setpoints.desired_temp = (setpoints.desired_temp + rng.random_range(-5.0..8.0)).max(0.0);
            setpoints.inlet_temp = (setpoints.inlet_temp + rng.random_range(-5.0..8.0)).max(0.0);
            setpoints.inlet_pressure =
                (setpoints.inlet_pressure + rng.random_range(-50.0..80.0)).max(0.0);
            setpoints.fan_speed = rng.random_range(800.0..1600.0);

            let mut commands = vec![PanelCommand::SetSetpoints(setpoints)];
            if round % 100 == 99 {
                commands.push(PanelCommand::EditRange {
                    gauge: GaugeId::Thermometer,
                    max_value: 100.0,
                    step: 10.0,
                });
                setpoints = ProcessSetpoints::default();
            }
            if commands.into_iter().any(|cmd| sender.send(cmd).is_err()) {
                break;
            }
            thread::sleep(Duration::from_millis(250));
        }
    });

    println!("Displaying panel with wandering setpoints:");
    println!("- Thermometer auto-ranges as the outlet heats up");
    println!("- Pressure dial auto-ranges as inlet pressure climbs");
    println!("- Thermometer range is reset every 100 rounds");
    println!("Press Ctrl+C to exit");

    app::run(config, Some(receiver))
}
