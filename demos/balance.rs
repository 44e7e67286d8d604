//! Demo of the Sartorius balance driver.

use benchproto::balance::{Balance, Diagnostic};
use simple_logger::SimpleLogger;
use std::{thread, time::Duration};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Enable logging
    SimpleLogger::new().init().unwrap();

    let mut balance = Balance::open_serial("/dev/ttyUSB1")?;
    if let Diagnostic::Failed(message) = balance.diagnostic_probe() {
        return Err(message.into());
    }

    balance.tare_and_zero()?;
    thread::sleep(Duration::from_secs(2));

    let unit = balance.read_unit()?;
    for _ in 0..10 {
        println!("{} {unit}", balance.read_value()?);
        thread::sleep(Duration::from_secs(1));
    }
    Ok(())
}
