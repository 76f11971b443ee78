use graph_kernels::prelude::Counter;
use graph_kernels::utils::{HyperLogLogCounterArray, HyperLogLogCounterArrayBuilder};

fn build(num_counters: usize, log2m: usize) -> HyperLogLogCounterArray<i64> {
    HyperLogLogCounterArrayBuilder::new()
        .log_2_num_registers(log2m)
        .num_elements_upper_bound(1 << 20)
        .build(num_counters)
        .unwrap()
}

#[test]
fn test_single_counter_estimate_within_tolerance() {
    let num_trials = 10;
    let sizes = [1, 10, 100, 1000, 100_000];
    let log2ms = [6, 8, 12];

    for size in sizes {
        for log2m in log2ms {
            let rsd = HyperLogLogCounterArray::<i64>::relative_standard_deviation(log2m);
            let mut correct = 0;

            for _ in 0..num_trials {
                let counters = build(1, log2m);
                let mut counter = counters.get_counter(0);
                let incr = (1_i64 << 32) / size as i64;
                let mut x = i64::MIN;
                for _ in 0..size {
                    counter.add(x);
                    x += incr;
                }

                let float_size = size as f64;
                if (float_size - counter.estimate_count()).abs() / float_size < 2.0 * rsd {
                    correct += 1;
                }
            }

            assert!(correct >= 9, "size={size} log2m={log2m} correct={correct}");
        }
    }
}

#[test]
fn test_two_independent_counters_estimate_within_tolerance() {
    let num_trials = 10;
    let sizes = [1, 10, 100, 1000, 100_000];
    let log2ms = [4, 6, 8, 12];

    for size in sizes {
        for log2m in log2ms {
            let rsd = HyperLogLogCounterArray::<i64>::relative_standard_deviation(log2m);
            let mut correct_0 = 0;
            let mut correct_1 = 0;

            for _ in 0..num_trials {
                let counters = build(2, log2m);
                let incr = (1_i64 << 32) / size as i64;
                let mut x = i64::MIN;
                for _ in 0..size {
                    counters.get_counter(0).add(x);
                    counters.get_counter(1).add(x);
                    x += incr;
                }

                let float_size = size as f64;
                if (float_size - counters.get_counter(0).estimate_count()).abs() / float_size
                    < 2.0 * rsd
                {
                    correct_0 += 1;
                }
                if (float_size - counters.get_counter(1).estimate_count()).abs() / float_size
                    < 2.0 * rsd
                {
                    correct_1 += 1;
                }
            }

            assert!(correct_0 >= 9);
            assert!(correct_1 >= 9);
        }
    }
}

#[test]
fn test_safe_merge_unions_disjoint_counters() {
    let num_trials = 10;
    let sizes = [1, 10, 100, 1000, 100_000];
    let log2ms = [4, 6, 8, 12];

    for size in sizes {
        for log2m in log2ms {
            let rsd = HyperLogLogCounterArray::<i64>::relative_standard_deviation(log2m);
            let mut correct_0 = 0;
            let mut correct_1 = 0;

            for _ in 0..num_trials {
                let counters = build(2, log2m);
                let incr = (1_i64 << 32) / (size * 2) as i64;
                let mut x = i64::MIN;
                for _ in 0..size {
                    counters.get_counter(0).add(x);
                    x += incr;
                    counters.get_counter(1).add(x);
                    x += incr;
                }

                counters.get_counter(0).merge(&counters.get_counter(1));

                let float_size = size as f64;
                if (float_size * 2.0 - counters.get_counter(0).estimate_count()).abs()
                    / (float_size * 2.0)
                    < 2.0 * rsd
                {
                    correct_0 += 1;
                }
                if (float_size - counters.get_counter(1).estimate_count()).abs()
                    / (float_size * 2.0)
                    < 2.0 * rsd
                {
                    correct_1 += 1;
                }
            }

            assert!(correct_0 >= 9);
            assert!(correct_1 >= 9);
        }
    }
}

#[test]
fn test_merge_unsafe_matches_safe_merge() {
    let num_trials = 10;
    let sizes = [1, 10, 100, 1000, 100_000];
    let log2m = 4;

    for size in sizes {
        let rsd = HyperLogLogCounterArray::<i64>::relative_standard_deviation(log2m);
        let mut correct_0 = 0;
        let mut correct_1 = 0;

        for _ in 0..num_trials {
            let counters = build(2, log2m);
            let incr = (1_i64 << 32) / (size * 2) as i64;
            let mut x = i64::MIN;
            for _ in 0..size {
                counters.get_counter(0).add(x);
                x += incr;
                counters.get_counter(1).add(x);
                x += incr;
            }

            unsafe {
                counters.get_counter(0).merge_unsafe(&counters.get_counter(1));
            }

            let float_size = size as f64;
            if (float_size * 2.0 - counters.get_counter(0).estimate_count()).abs()
                / (float_size * 2.0)
                < 2.0 * rsd
            {
                correct_0 += 1;
            }
            if (float_size - counters.get_counter(1).estimate_count()).abs() / (float_size * 2.0)
                < 2.0 * rsd
            {
                correct_1 += 1;
            }
        }

        assert!(correct_0 >= 9);
        assert!(correct_1 >= 9);
    }
}
