//! Demo of the Reglo ICC pump driver.

use benchproto::pump::{Direction, Mode, Pump};
use simple_logger::SimpleLogger;
use std::{thread, time::Duration};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Enable logging
    SimpleLogger::new().init().unwrap();

    let mut pump = Pump::open_serial("/dev/ttyUSB0")?;

    // Run channels 1 and 2 in opposite directions at different speeds.
    for (channel, direction, speed) in [
        (1, Direction::Clockwise, 24.0),
        (2, Direction::CounterClockwise, 12.5),
    ] {
        pump.set_mode(channel, Mode::Rpm)?;
        pump.set_direction(channel, direction)?;
        pump.set_speed(channel, speed)?;
        pump.start_channel(channel)?;
    }

    thread::sleep(Duration::from_secs(5));
    println!("channel 1 speed: {}", pump.get_speed(1)?.trim());
    println!("channel 2 direction: {}", pump.get_direction(2)?.trim());

    for channel in 1..=2 {
        pump.stop_channel(channel)?;
        println!("channel {channel}: {:?}", pump.requested_state(channel)?);
    }
    Ok(())
}
