//! MySQL driver shelling out to `mysqldump` / `mysql`
//!
//! Binary locations come from the `mysql` settings section; connection
//! parameters are passed on the command line. Both operations run to
//! completion synchronously and report the client's stderr verbatim on
//! failure.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::settings::MysqlSettings;

use super::{DatabaseDriver, DriverResult};

/// Connection parameters for the MySQL client binaries
#[derive(Debug, Clone)]
pub struct MysqlConnection {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Driver invoking the MySQL client binaries
#[derive(Debug, Clone)]
pub struct MysqlDriver {
    dump_command_dir: PathBuf,
    restore_command_dir: PathBuf,
    connection: MysqlConnection,
}

impl MysqlDriver {
    pub fn new(settings: &MysqlSettings, connection: MysqlConnection) -> Self {
        Self {
            dump_command_dir: PathBuf::from(&settings.dump_command_dir),
            restore_command_dir: PathBuf::from(&settings.restore_command_dir),
            connection,
        }
    }

    fn connection_args(&self, cmd: &mut Command) {
        cmd.arg(format!("--host={}", self.connection.host))
            .arg(format!("--user={}", self.connection.user))
            .arg(format!("--password={}", self.connection.password))
            .arg(&self.connection.database);
    }
}

impl DatabaseDriver for MysqlDriver {
    fn dump(&self, path: &Path) -> DriverResult {
        let out = std::fs::File::create(path)
            .map_err(|e| format!("cannot create dump file {}: {}", path.display(), e))?;

        let mut cmd = Command::new(self.dump_command_dir.join("mysqldump"));
        self.connection_args(&mut cmd);
        cmd.stdout(Stdio::from(out)).stderr(Stdio::piped());

        let output = cmd
            .output()
            .map_err(|e| format!("failed to run mysqldump: {}", e))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
        }
    }

    fn restore(&self, path: &Path) -> DriverResult {
        let input = std::fs::File::open(path)
            .map_err(|e| format!("cannot open dump file {}: {}", path.display(), e))?;

        let mut cmd = Command::new(self.restore_command_dir.join("mysql"));
        self.connection_args(&mut cmd);
        cmd.stdin(Stdio::from(input)).stderr(Stdio::piped());

        let output = cmd
            .output()
            .map_err(|e| format!("failed to run mysql: {}", e))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
        }
    }
}
