// ============================================================================
// CANCELLATION & PROGRESS - cooperative abort with exact state restoration
// ============================================================================
//
// Every long-running filter runs through `run_cancelable`. The wrapper owns
// the pre-operation snapshot: units of work read from the snapshot and write
// into the live image, and a cancel request swaps the snapshot back in before
// anything else happens. Individual algorithms never see the token.
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::canvas::Image;

/// Shared abort flag. Cloning shares the same flag.
///
/// One thread (the requester) calls [`cancel`](Self::cancel); the worker polls
/// [`is_cancelled`](Self::is_cancelled) between units of work. The flag stays
/// set until [`reset`](Self::reset) is called before the next operation.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Receives `(current, total)` pairs while a cancelable filter runs.
pub trait ProgressSink {
    fn report(&mut self, current: u32, total: u32);
}

/// Receives human-readable status lines ("Blur filter applied").
pub trait StatusSink {
    fn message(&mut self, text: &str);
}

impl<T: ProgressSink + ?Sized> ProgressSink for &mut T {
    fn report(&mut self, current: u32, total: u32) {
        (**self).report(current, total);
    }
}

impl<T: StatusSink + ?Sized> StatusSink for &mut T {
    fn message(&mut self, text: &str) {
        (**self).message(text);
    }
}

/// Discards everything. Used for headless runs and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn report(&mut self, _current: u32, _total: u32) {}
}

impl StatusSink for NoopSink {
    fn message(&mut self, _text: &str) {}
}

/// Mirrors status lines and progress into the session log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&mut self, current: u32, total: u32) {
        let percent = if total == 0 { 100 } else { current as u64 * 100 / total as u64 };
        crate::logger::write(
            crate::logger::Level::Progress,
            &format!("{}/{} ({}%)", current, total, percent),
        );
    }
}

impl StatusSink for LogSink {
    fn message(&mut self, text: &str) {
        crate::log_info!("{}", text);
    }
}

/// Terminal state of a filter call that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The image was restored to its pre-operation content.
    Cancelled,
}

/// Which axis a cancelable filter iterates over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Rows,
    Columns,
}

/// Everything a filter call needs from its caller: the abort flag and the two
/// reporting sinks.
pub struct Job<'a> {
    cancel: CancelToken,
    progress: Box<dyn ProgressSink + 'a>,
    status: Box<dyn StatusSink + 'a>,
    interval: Option<u32>,
}

impl<'a> Job<'a> {
    pub fn new(
        cancel: CancelToken,
        progress: impl ProgressSink + 'a,
        status: impl StatusSink + 'a,
    ) -> Self {
        Self {
            cancel,
            progress: Box::new(progress),
            status: Box::new(status),
            interval: None,
        }
    }

    /// A job nobody can cancel and nobody listens to.
    pub fn detached() -> Job<'static> {
        Job::new(CancelToken::new(), NoopSink, NoopSink)
    }

    /// Override every filter's own reporting cadence.
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval.max(1));
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn status(&mut self, text: &str) {
        self.status.message(text);
    }
}

/// Run `unit` once per row (or column) of `image` under the cancellation
/// protocol.
///
/// `unit(src, dst, index)` reads the pre-operation snapshot `src` and writes
/// the live buffer `dst`, which starts out as a copy of `src`. Before every
/// unit the token is polled; when set, `dst` is overwritten with the snapshot
/// and `Outcome::Cancelled` is returned.
pub fn run_cancelable<F>(
    image: &mut Image,
    name: &str,
    axis: Axis,
    interval: u32,
    job: &mut Job<'_>,
    mut unit: F,
) -> Outcome
where
    F: FnMut(&Image, &mut Image, u32),
{
    let snapshot = image.clone();
    let total = match axis {
        Axis::Rows => image.height(),
        Axis::Columns => image.width(),
    };
    let interval = job.interval.unwrap_or(interval).max(1);

    job.status(&format!("Applying {} filter...", name));

    for i in 0..total {
        if job.cancel.is_cancelled() {
            *image = snapshot;
            job.status(&format!("{} filter cancelled", name));
            return Outcome::Cancelled;
        }

        unit(&snapshot, image, i);

        let done = i + 1;
        if done % interval == 0 || done == total {
            job.progress.report(done, total);
        }
    }

    job.status(&format!("{} filter applied", name));
    Outcome::Completed
}

/// Convenience for per-pixel colour remaps: applies `f` to every pixel of
/// each row under the protocol.
pub fn run_per_pixel<F>(
    image: &mut Image,
    name: &str,
    interval: u32,
    job: &mut Job<'_>,
    mut f: F,
) -> Outcome
where
    F: FnMut(u32, u32, [u8; 3]) -> [u8; 3],
{
    run_cancelable(image, name, Axis::Rows, interval, job, |src, dst, y| {
        for x in 0..src.width() {
            dst.put_pixel(x, y, f(x, y, src.pixel(x, y)));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        reports: Vec<(u32, u32)>,
    }

    impl ProgressSink for Recorder {
        fn report(&mut self, current: u32, total: u32) {
            self.reports.push((current, total));
        }
    }

    #[derive(Default)]
    struct Messages(Vec<String>);

    impl StatusSink for Messages {
        fn message(&mut self, text: &str) {
            self.0.push(text.to_string());
        }
    }

    fn fill_rows(src: &Image, dst: &mut Image, y: u32) {
        for x in 0..src.width() {
            dst.put_pixel(x, y, [1, 2, 3]);
        }
    }

    #[test]
    fn reports_at_interval_and_on_last_unit() {
        let mut img = Image::new(2, 7);
        let mut rec = Recorder::default();
        let mut job = Job::new(CancelToken::new(), &mut rec, NoopSink);
        let outcome = run_cancelable(&mut img, "Test", Axis::Rows, 3, &mut job, fill_rows);
        drop(job);
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(rec.reports, vec![(3, 7), (6, 7), (7, 7)]);
        assert_eq!(img.pixel(1, 6), [1, 2, 3]);
    }

    #[test]
    fn column_axis_uses_width_as_total() {
        let mut img = Image::new(4, 2);
        let mut rec = Recorder::default();
        let mut job = Job::new(CancelToken::new(), &mut rec, NoopSink);
        run_cancelable(&mut img, "Test", Axis::Columns, 1, &mut job, |_, _, _| {});
        drop(job);
        assert_eq!(rec.reports.last(), Some(&(4, 4)));
        assert_eq!(rec.reports.len(), 4);
    }

    #[test]
    fn pre_set_token_leaves_image_untouched() {
        let original = Image::filled(3, 3, [9, 9, 9]);
        let mut img = original.clone();
        let token = CancelToken::new();
        token.cancel();
        let mut msgs = Messages::default();
        let mut job = Job::new(token, NoopSink, &mut msgs);
        let outcome = run_cancelable(&mut img, "Blur", Axis::Rows, 1, &mut job, fill_rows);
        drop(job);
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(img, original);
        assert_eq!(msgs.0.last().map(String::as_str), Some("Blur filter cancelled"));
    }

    #[test]
    fn cancel_mid_run_restores_snapshot() {
        let original = Image::filled(5, 10, [40, 50, 60]);
        let mut img = original.clone();
        let token = CancelToken::new();
        let trigger = token.clone();
        let mut job = Job::new(token, NoopSink, NoopSink);
        let outcome = run_cancelable(&mut img, "Test", Axis::Rows, 1, &mut job, |src, dst, y| {
            fill_rows(src, dst, y);
            if y == 4 {
                trigger.cancel();
            }
        });
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(img, original);
    }

    #[test]
    fn interval_override_applies() {
        let mut img = Image::new(1, 4);
        let mut rec = Recorder::default();
        let mut job = Job::new(CancelToken::new(), &mut rec, NoopSink).with_interval(1);
        run_cancelable(&mut img, "Test", Axis::Rows, 50, &mut job, fill_rows);
        drop(job);
        assert_eq!(rec.reports, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    }

    #[test]
    fn token_is_shared_across_threads() {
        let token = CancelToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel())
            .join()
            .expect("cancel thread panicked");
        assert!(token.is_cancelled());
        token.reset();
        assert!(!token.is_cancelled());
    }
}
