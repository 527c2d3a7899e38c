use rulestage::{
    result_fn, schema_fn, ConditionalRule, RejectedSeat, ResultBinding, Rule, RuleResult,
    SchemaBinding,
};

/// Seats still bidding on an impression.
type Seats = Vec<String>;

struct Impression {
    media_type: &'static str,
    gdpr: bool,
}

fn main() {
    // Two dimensions: media type, then whether GDPR applies.
    let rule = ConditionalRule::builder("privacy", "1")
        .schema(SchemaBinding::new(
            "mediaType",
            schema_fn(|_: &Seats, imp: &Impression| Some(imp.media_type.to_owned())),
        ))
        .schema(SchemaBinding::new(
            "gdpr",
            schema_fn(|_: &Seats, imp: &Impression| Some(imp.gdpr.to_string())),
        ))
        .when(
            &["*", "true"],
            vec![ResultBinding::new(
                "excludeSeat",
                result_fn(|mut seats: Seats, _| {
                    seats.retain(|s| s != "tracker");
                    Ok(RuleResult::updated(seats)
                        .with_rejected_seats([RejectedSeat::new("tracker", 301)]))
                }),
            )],
        )
        .when(
            &["video", "*"],
            vec![ResultBinding::new(
                "rejectVideo",
                result_fn(|_: Seats, _| Ok(RuleResult::rejected())),
            )],
        )
        .build()
        .expect("failed to compile rule");

    println!("{rule:?}");

    let seats = || vec!["tracker".to_owned(), "dsp".to_owned()];
    let impressions = [
        Impression { media_type: "banner", gdpr: true },
        Impression { media_type: "banner", gdpr: false },
        Impression { media_type: "video", gdpr: false },
    ];

    for imp in &impressions {
        let result = rule.process(seats(), imp).expect("evaluation failed");
        println!(
            "{} gdpr={}: action={} seats={:?} rejected={:?}",
            imp.media_type,
            imp.gdpr,
            result.action(),
            result.value(),
            result.rejected_seats(),
        );
    }
}
