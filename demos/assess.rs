use mandarin_assess::normalize::{normalize, PassThrough};
use mandarin_assess::romanize::PinyinRomanizer;
use mandarin_assess::scoring::assess;

fn main() {
    env_logger::init();

    let pairs = [
        ("你好", "你好"),
        ("妈", "骂"),
        ("你好", "李好"),
        ("谢谢", "写写"),
        ("你好", "你"),
    ];

    for (expected, heard) in pairs {
        let heard = normalize(heard, &PassThrough);
        let result = assess(expected, &heard);

        println!(
            "{expected} ({}) vs {heard}",
            PinyinRomanizer.romanize_display(expected)
        );
        println!(
            "  {} -> {}  score {:.1}",
            result.expected_pinyin, result.actual_pinyin, result.score
        );
        for detail in &result.syllable_details {
            println!(
                "  [{}] {} / {}: {}",
                detail.position, detail.expected, detail.actual, detail.comparison.feedback
            );
        }
        println!("  {}\n", result.summary);
    }
}
