use crossbeam_channel::bounded;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use datasign::error::{DigestError, SignError};
use datasign::pipeline::{Combine, MultiHash, Stage, StageContext};
use datasign::service::{Crc32Md5, HashService};
use datasign::{WorkItem, default_seed, sign_items, sign_values};

/// Known-correct combined output for the seed [0, 1] (CRC32/MD5 semantics).
const GOLDEN_SEED_0_1: &str = "29568666068035183841425683795340791879727309630931025356555_4958044192186797981418233587017209679042592862002427381542";

/// Known-correct combined output for the seed [0, 1, 2, 3, 4, 5, 6].
const GOLDEN_SEED_0_6: &str = "134160622214910211981638367438198914151832445908675415182_1696913515191343735512658979631549563179965036907783101867_17003232074202847257217454156250792790820070961243900397730_27225454331033649287118297354036464389062965355426795162684_29568666068035183841425683795340791879727309630931025356555_3994492081516972096677631278379039212655368881548151736_4958044192186797981418233587017209679042592862002427381542";

// --- test doubles ---

/// Wraps the reference service and records whether two slow calls ever overlap.
struct CountingSlow {
    inner: Crc32Md5,
    in_flight: AtomicUsize,
    overlapped: AtomicBool,
}

impl CountingSlow {
    fn new() -> Self {
        CountingSlow {
            inner: Crc32Md5,
            in_flight: AtomicUsize::new(0),
            overlapped: AtomicBool::new(false),
        }
    }
}

impl HashService for CountingSlow {
    fn fast_digest(&self, input: &str) -> Result<String, DigestError> {
        self.inner.fast_digest(input)
    }

    fn slow_digest(&self, input: &str) -> Result<String, DigestError> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        // Widen the window so an overlapping caller would be caught.
        thread::sleep(Duration::from_millis(2));
        let out = self.inner.slow_digest(input);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        out
    }
}

/// Wraps the reference service with a deterministic per-call delay so the
/// scheduler interleaves runs differently without changing any digest.
struct Jittery(Crc32Md5);

fn jitter(input: &str, modulus: u64) {
    let sum: u64 = input.bytes().map(u64::from).sum();
    thread::sleep(Duration::from_millis(sum % modulus));
}

impl HashService for Jittery {
    fn fast_digest(&self, input: &str) -> Result<String, DigestError> {
        jitter(input, 4);
        self.0.fast_digest(input)
    }

    fn slow_digest(&self, input: &str) -> Result<String, DigestError> {
        jitter(input, 3);
        self.0.slow_digest(input)
    }
}

/// Echoes its input in brackets, finishing higher-indexed slots first so a
/// completion-ordered join would come out reversed.
struct SlotEcho;

impl HashService for SlotEcho {
    fn fast_digest(&self, input: &str) -> Result<String, DigestError> {
        if let Some(k) = input.chars().next().and_then(|c| c.to_digit(10)) {
            thread::sleep(Duration::from_millis(u64::from(5 - k.min(5)) * 3));
        }
        Ok(format!("[{input}]"))
    }

    fn slow_digest(&self, input: &str) -> Result<String, DigestError> {
        Ok(input.to_string())
    }
}

/// Fails the slow digest for one specific input, delegating everything else.
struct FailingSlow {
    inner: Crc32Md5,
    poison: &'static str,
}

impl HashService for FailingSlow {
    fn fast_digest(&self, input: &str) -> Result<String, DigestError> {
        self.inner.fast_digest(input)
    }

    fn slow_digest(&self, input: &str) -> Result<String, DigestError> {
        if input == self.poison {
            return Err(DigestError("simulated outage".to_string()));
        }
        self.inner.slow_digest(input)
    }
}

/// Counts every digest call; used to assert a rejected seed never reaches the service.
struct CallCounter(AtomicUsize);

impl HashService for CallCounter {
    fn fast_digest(&self, input: &str) -> Result<String, DigestError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(input.to_string())
    }

    fn slow_digest(&self, input: &str) -> Result<String, DigestError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(input.to_string())
    }
}

// --- golden end-to-end fixtures ---

#[test]
fn test_golden_output_seed_0_1() {
    let out = sign_items(default_seed(2), Arc::new(Crc32Md5)).unwrap();
    assert_eq!(out, GOLDEN_SEED_0_1);
}

#[test]
fn test_golden_output_seed_0_6() {
    let out = sign_items(default_seed(7), Arc::new(Crc32Md5)).unwrap();
    assert_eq!(out, GOLDEN_SEED_0_6);
}

#[test]
fn test_string_and_int_seeds_mix() {
    // "3" as a string must sign identically to the integer 3.
    let as_int = sign_items(vec![WorkItem::Int(3)], Arc::new(Crc32Md5)).unwrap();
    let as_str = sign_items(vec![WorkItem::from("3")], Arc::new(Crc32Md5)).unwrap();
    assert_eq!(as_int, as_str);
}

// --- determinism ---

#[test]
fn test_deterministic_under_jitter() {
    let mut outputs = Vec::new();
    for _ in 0..3 {
        let out = sign_items(default_seed(2), Arc::new(Jittery(Crc32Md5))).unwrap();
        outputs.push(out);
    }
    for out in &outputs {
        assert_eq!(out, GOLDEN_SEED_0_1);
    }
}

// --- mutual exclusion of the slow digest ---

#[test]
fn test_slow_digest_never_overlaps() {
    let service = Arc::new(CountingSlow::new());
    let out = sign_items(default_seed(10), Arc::clone(&service) as Arc<dyn HashService>);
    assert!(out.is_ok());
    assert!(
        !service.overlapped.load(Ordering::SeqCst),
        "two slow digest calls were in flight at once"
    );
}

// --- slot integrity (multi-hash stage in isolation) ---

#[test]
fn test_multi_hash_joins_slots_in_index_order() {
    let ctx = StageContext::new(Arc::new(SlotEcho));
    let (in_tx, in_rx) = bounded(16);
    let (out_tx, out_rx) = bounded(16);
    in_tx.send("x".to_string()).unwrap();
    drop(in_tx);

    MultiHash.run(in_rx, out_tx, &ctx).unwrap();

    assert_eq!(out_rx.recv().unwrap(), "[0x][1x][2x][3x][4x][5x]");
    assert!(out_rx.recv().is_err(), "multi_hash emits once per item");
}

// --- combine ordering ---

#[test]
fn test_combine_sorts_unordered_arrivals() {
    let ctx = StageContext::new(Arc::new(Crc32Md5));
    let (in_tx, in_rx) = bounded(16);
    let (out_tx, out_rx) = bounded(16);
    for item in ["b", "a", "c"] {
        in_tx.send(item.to_string()).unwrap();
    }
    drop(in_tx);

    Combine.run(in_rx, out_tx, &ctx).unwrap();

    assert_eq!(out_rx.recv().unwrap(), "a_b_c");
}

// --- count invariant ---

#[test]
fn test_combined_output_has_one_segment_per_seed_item() {
    let out = sign_items(default_seed(7), Arc::new(Crc32Md5)).unwrap();
    let segments: Vec<&str> = out.split('_').collect();
    assert_eq!(segments.len(), 7);
    assert!(segments.iter().all(|s| !s.is_empty()));
}

#[test]
fn test_empty_seed_yields_empty_result() {
    let out = sign_items(Vec::new(), Arc::new(Crc32Md5)).unwrap();
    assert_eq!(out, "");
}

// --- failure semantics ---

#[test]
fn test_unsupported_seed_item_aborts_before_any_digest() {
    let service = Arc::new(CallCounter(AtomicUsize::new(0)));
    let values = [json!(0), json!(null), json!(1)];
    let err = sign_values(&values, Arc::clone(&service) as Arc<dyn HashService>).unwrap_err();
    assert!(matches!(err, SignError::UnsupportedInput(_)));
    assert_eq!(service.0.load(Ordering::SeqCst), 0);
}

#[test]
fn test_float_and_bool_seed_items_are_rejected() {
    for value in [json!(1.5), json!(true), json!([1, 2])] {
        let err = sign_values(&[value], Arc::new(Crc32Md5)).unwrap_err();
        assert!(matches!(err, SignError::UnsupportedInput(_)));
    }
}

#[test]
fn test_digest_failure_aborts_whole_run() {
    let service = Arc::new(FailingSlow {
        inner: Crc32Md5,
        poison: "3",
    });
    let err = sign_items(default_seed(7), service).unwrap_err();
    match err {
        SignError::Aborted(inner) => assert!(matches!(*inner, SignError::HashService(_))),
        other => panic!("expected Aborted, got {other:?}"),
    }
}
