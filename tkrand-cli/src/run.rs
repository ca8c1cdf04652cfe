//! The one thing `tkey-random` does: identify the app, then fetch bytes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tkrand::{NameVersion, RandomGen, Transport};

use crate::OutputFormat;

/// Resolved options for a run.
#[derive(Debug)]
pub(crate) struct RunArgs {
    pub port: PathBuf,
    pub speed: u32,
    pub bytes: usize,
    pub format: OutputFormat,
}

/// What a successful run produced.
#[derive(Debug)]
struct Report {
    app: NameVersion,
    random: Vec<u8>,
}

#[cfg(unix)]
pub(crate) fn run(args: &RunArgs) -> Result<()> {
    let config = tkrand::SerialConfig::new(&args.port).speed(args.speed);
    let port = tkrand::SerialPort::open(&config)
        .with_context(|| format!("opening {}", args.port.display()))?;

    let mut rng = RandomGen::new(port);
    let report = fetch(&mut rng, args.bytes);
    let closed = rng.close();

    let report = report?;
    closed.context("closing port")?;
    print_report(&report, args.format)
}

#[cfg(not(unix))]
pub(crate) fn run(_args: &RunArgs) -> Result<()> {
    anyhow::bail!("serial ports are only supported on unix hosts")
}

/// Runs both operations on an open session.
fn fetch<T: Transport>(rng: &mut RandomGen<T>, bytes: usize) -> Result<Report> {
    let app = rng
        .get_app_name_version()
        .context("GetAppNameVersion failed")?;
    tracing::info!(%app, "app running");
    let random = rng.get_random(bytes).context("GetRandom failed")?;
    Ok(Report { app, random })
}

fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&to_json(report))?);
        }
        OutputFormat::Text => {
            let app = &report.app;
            eprintln!(
                "App name0:'{}' name1:'{}' version:{}",
                app.name0, app.name1, app.version
            );
            println!("{}", hex::encode(&report.random));
        }
    }
    Ok(())
}

fn to_json(report: &Report) -> serde_json::Value {
    serde_json::json!({
        "app": report.app,
        "random": hex::encode(&report.random),
    })
}

#[cfg(test)]
mod tests {
    use std::io::{self, Read, Write};
    use std::time::Duration;

    use super::*;

    /// Plays back one name/version reply and one random reply.
    struct Canned(io::Cursor<Vec<u8>>);

    impl Read for Canned {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Write for Canned {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for Canned {
        fn set_read_timeout(&mut self, _: Option<Duration>) -> io::Result<()> {
            Ok(())
        }

        fn close(self) -> io::Result<()> {
            Ok(())
        }
    }

    fn canned_device() -> Canned {
        // id 2, app endpoint, Len32 / Len128.
        let mut rx = vec![0x5a, 0x02];
        rx.extend_from_slice(b"tk1 rand");
        rx.extend_from_slice(&2u32.to_le_bytes());
        rx.resize(33, 0);
        rx.extend_from_slice(&[0x5b, 0x04, 0x00, 0xca, 0xfe]);
        rx.resize(33 + 129, 0);
        Canned(io::Cursor::new(rx))
    }

    #[test]
    fn fetch_reports_app_and_bytes() {
        let mut rng = RandomGen::new(canned_device());
        let report = fetch(&mut rng, 2).unwrap();
        assert_eq!(report.app.to_string(), "tk1 rand 2");
        assert_eq!(report.random, vec![0xca, 0xfe]);
    }

    #[test]
    fn fetch_surfaces_range_error() {
        let mut rng = RandomGen::new(canned_device());
        let err = fetch(&mut rng, 200).unwrap_err();
        assert!(format!("{err:#}").contains("not in [1,126]"));
    }

    #[test]
    fn json_report_carries_hex_and_app() {
        let mut rng = RandomGen::new(canned_device());
        let report = fetch(&mut rng, 2).unwrap();

        let obj = to_json(&report);
        assert_eq!(obj["random"], "cafe");
        assert_eq!(obj["app"]["name1"], "rand");
        assert_eq!(obj["app"]["version"], 2);
    }
}
