use {
    crate::utils::{errorfmt::ErrorFmt, oserror::OsError},
    log::{Level, Log, Metadata, Record},
    std::{
        fmt::Arguments,
        io::Write,
        sync::{
            Arc,
            atomic::{AtomicU32, Ordering::Relaxed},
        },
        time::SystemTime,
    },
    uapi::{Fd, OwnedFd},
};

/// Writes log records to a duplicate of stderr.
pub struct Logger {
    level: AtomicU32,
    file: OwnedFd,
}

impl Logger {
    pub fn install_stderr(level: Level) -> Arc<Self> {
        let file = match uapi::fcntl_dupfd_cloexec(2, 0) {
            Ok(fd) => fd,
            Err(e) => {
                let e = OsError::from(e);
                eprintln!("Error: Could not dup stderr: {}", ErrorFmt(e));
                std::process::exit(1);
            }
        };
        let slf = Arc::new(Self {
            level: AtomicU32::new(level as _),
            file,
        });
        let wrapper = Box::new(LogWrapper {
            logger: slf.clone(),
        });
        if log::set_boxed_logger(wrapper).is_ok() {
            log::set_max_level(level.to_level_filter());
        }
        slf
    }

    fn enabled(&self, level: Level) -> bool {
        level as u32 <= self.level.load(Relaxed)
    }
}

struct LogWrapper {
    logger: Arc<Logger>,
}

impl Log for LogWrapper {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.logger.enabled(metadata.level())
    }

    fn log(&self, record: &Record) {
        if !self.logger.enabled(record.level()) {
            return;
        }
        let line = format_line(
            SystemTime::now(),
            record.level(),
            record.module_path(),
            record.args(),
        );
        let mut fd = Fd::new(self.logger.file.raw());
        let _ = fd.write_all(&line);
    }

    fn flush(&self) {
        // nothing
    }
}

fn format_line(
    time: SystemTime,
    level: Level,
    module: Option<&str>,
    args: &Arguments<'_>,
) -> Vec<u8> {
    let mut line = vec![];
    let time = humantime::format_rfc3339_millis(time);
    let _ = match module {
        Some(module) => writeln!(line, "[{} {:5} {}] {}", time, level, module, args),
        _ => writeln!(line, "[{} {:5}] {}", time, level, args),
    };
    line
}

#[cfg(test)]
mod tests;
