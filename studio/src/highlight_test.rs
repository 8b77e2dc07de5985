use super::*;

fn result_for(job: &HighlightJob) -> HighlightResult {
    HighlightResult {
        generation: job.generation,
        source_len: job.source.len(),
        markup: format!("<{}>", job.source),
    }
}

#[test]
fn no_recompute_until_threshold_growth_while_streaming() {
    let mut scheduler = HighlightScheduler::new();

    let short = "x".repeat(RECOMPUTE_THRESHOLD);
    assert!(scheduler.observe(&short, SessionStatus::Streaming).is_none());

    let over = "x".repeat(RECOMPUTE_THRESHOLD + 1);
    let job = scheduler.observe(&over, SessionStatus::Streaming).unwrap();
    assert_eq!(job.generation, 1);
    assert_eq!(job.source, over);
}

#[test]
fn stream_end_always_recomputes() {
    let mut scheduler = HighlightScheduler::new();
    assert!(scheduler.observe("hi", SessionStatus::Complete).is_some());

    let mut scheduler = HighlightScheduler::new();
    assert!(scheduler.observe("hi", SessionStatus::Failed).is_some());
}

#[test]
fn issue_time_bookkeeping_prevents_redundant_jobs() {
    let mut scheduler = HighlightScheduler::new();
    let text = "x".repeat(RECOMPUTE_THRESHOLD + 1);
    let job = scheduler.observe(&text, SessionStatus::Streaming).unwrap();

    // Job still in flight (not applied); a barely-grown buffer must not
    // trigger another one.
    let barely = "x".repeat(RECOMPUTE_THRESHOLD + 2);
    assert!(scheduler.observe(&barely, SessionStatus::Streaming).is_none());
    drop(job);
}

#[test]
fn stale_result_discarded_regardless_of_resolution_order() {
    let mut scheduler = HighlightScheduler::new();

    let a = scheduler.observe(&"a".repeat(60), SessionStatus::Streaming).unwrap();
    let b = scheduler.observe(&"b".repeat(120), SessionStatus::Streaming).unwrap();
    assert!(a.generation < b.generation);

    // B resolves first, then the slow A arrives late.
    assert!(scheduler.apply(result_for(&b)));
    assert!(!scheduler.apply(result_for(&a)));

    let displayed = scheduler.rendered().unwrap();
    assert_eq!(displayed.generation, b.generation);
    assert_eq!(displayed.markup, format!("<{}>", "b".repeat(120)));
}

#[test]
fn in_order_resolution_applies_both() {
    let mut scheduler = HighlightScheduler::new();
    let a = scheduler.observe(&"a".repeat(60), SessionStatus::Streaming).unwrap();
    let b = scheduler.observe(&"b".repeat(120), SessionStatus::Streaming).unwrap();

    assert!(scheduler.apply(result_for(&a)));
    assert!(scheduler.apply(result_for(&b)));
    assert_eq!(scheduler.rendered().unwrap().generation, b.generation);
}

#[test]
fn empty_buffer_resets_synchronously_and_dooms_in_flight_jobs() {
    let mut scheduler = HighlightScheduler::new();
    let stale = scheduler.observe(&"a".repeat(60), SessionStatus::Streaming).unwrap();
    assert!(scheduler.apply(result_for(&stale)));
    let in_flight = scheduler.observe(&"a".repeat(120), SessionStatus::Streaming).unwrap();

    // New session empties the buffer.
    assert!(scheduler.observe("", SessionStatus::Streaming).is_none());
    assert!(scheduler.rendered().is_none());

    // The pre-reset job resolves late; it must not resurface.
    assert!(!scheduler.apply(result_for(&in_flight)));
    assert!(scheduler.rendered().is_none());
}

#[test]
fn generations_stay_strictly_increasing_across_resets() {
    let mut scheduler = HighlightScheduler::new();
    let first = scheduler.observe(&"a".repeat(60), SessionStatus::Streaming).unwrap();
    scheduler.reset();
    let second = scheduler.observe(&"b".repeat(60), SessionStatus::Streaming).unwrap();
    assert!(second.generation > first.generation);
}

#[test]
fn recompute_rate_bounded_by_growth() {
    // Stream of total length L in increments <= THRESHOLD each: at most
    // ceil(L / THRESHOLD) + 1 recomputes including the final one.
    let mut scheduler = HighlightScheduler::new();
    let total = 1000;
    let step = 40;
    let mut jobs = 0;

    let mut text = String::new();
    while text.len() < total {
        text.push_str(&"y".repeat(step.min(total - text.len())));
        if scheduler.observe(&text, SessionStatus::Streaming).is_some() {
            jobs += 1;
        }
    }
    if scheduler.observe(&text, SessionStatus::Complete).is_some() {
        jobs += 1;
    }

    assert!(jobs <= total.div_ceil(RECOMPUTE_THRESHOLD) + 1, "jobs = {jobs}");
    assert!(jobs >= 2, "scheduler starved the display entirely");
}

#[test]
fn syntect_renderer_emits_ansi_and_resets_style() {
    let highlighter = SyntectHighlighter::new();
    let markup = highlighter
        .render("export default function GeneratedComponent() { return null; }")
        .unwrap();
    assert!(markup.contains("\x1b["));
    assert!(markup.ends_with("\x1b[0m"));
}
