use core::fmt as core_fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        self, FmtContext, FormattedFields,
        format::{FormatEvent, FormatFields},
    },
    registry::LookupSpan,
};

/// Single-line event format:
/// `[timestamp] LEVEL thread target:line span{fields}: > message`.
///
/// Entered spans are printed root first, so an event logged while a
/// `rate_transposer{factor=1.5}` span is active carries the factor it was
/// produced at.
pub struct CustomFormatter {
    use_ansi: bool,
}

impl CustomFormatter {
    pub fn new(use_ansi: bool) -> Self {
        Self { use_ansi }
    }

    fn paint(&self, code: &'static str) -> &'static str {
        if self.use_ansi { code } else { "" }
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

fn timestamp() -> String {
    let format = time::macros::format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    );
    time::OffsetDateTime::now_local()
        .unwrap_or_else(|_| time::OffsetDateTime::now_utc())
        .format(&format)
        .unwrap_or_else(|_| "Unknown Time".to_string())
}

/// Thread name when it has one, otherwise the bare numeric id.
fn thread_label() -> String {
    let current = std::thread::current();
    match current.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", current.id())
            .trim_start_matches("ThreadId(")
            .trim_end_matches(')')
            .to_string(),
    }
}

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> core_fmt::Result {
        let reset = self.paint("\x1b[0m");
        let dim = self.paint("\x1b[2m");
        let metadata = event.metadata();

        write!(writer, "{}[{}]{} ", dim, timestamp(), reset)?;
        write!(
            writer,
            "{}{}{: <5}{} ",
            self.paint(level_color(metadata.level())),
            self.paint("\x1b[1m"),
            metadata.level().as_str(),
            reset
        )?;
        write!(writer, "{} ", thread_label())?;

        match metadata.line() {
            Some(line) => write!(writer, "{}{}:{}{} ", dim, metadata.target(), line, reset)?,
            None => write!(writer, "{}{}{} ", dim, metadata.target(), reset)?,
        }

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{}}}", fields)?;
                    }
                }
                write!(writer, ":")?;
            }
            write!(writer, " ")?;
        }

        write!(writer, "> ")?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer, "{}", reset)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::prelude::*;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .event_format(CustomFormatter::new(false))
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        );
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn plain_line_has_level_target_and_message() {
        let line = capture(|| tracing::warn!(wanted = 12, "short frame"));
        assert!(line.contains("WARN "), "{}", line);
        assert!(line.contains("sincflow::common::logger::formatter::tests:"), "{}", line);
        assert!(line.contains("> short frame wanted=12"), "{}", line);
        assert!(!line.contains('\x1b'));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn active_spans_are_printed_root_first() {
        let line = capture(|| {
            let outer = tracing::info_span!("chain");
            let _outer = outer.enter();
            let inner = tracing::info_span!("rate_transposer", factor = 1.5);
            let _inner = inner.enter();
            tracing::info!("primed");
        });
        assert!(
            line.contains("chain:rate_transposer{factor=1.5}: > primed"),
            "{}",
            line
        );
    }
}
