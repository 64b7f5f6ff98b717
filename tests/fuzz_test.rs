use std::time::Instant;
use vrtools::matcher::{classify_by_similarity, MatchChoice};
use vrtools::review::{ReviewAction, ReviewSession};
use vrtools::utils::token_set_ratio;

#[test]
fn test_garbage_names_never_panic() {
    let garbage = [
        "",
        " ",
        "___",
        "!!! @@@ ###",
        "1234567890",
        "Ünïcödé_Mätérïal",
        "材质_金属",
        "emoji_🚗_paint",
        "\t\n",
        "extremely_long_material_name_that_keeps_going_and_going_with_many_tokens_repeated_repeated_repeated",
    ];
    let names: Vec<String> = garbage.iter().map(|s| s.to_string()).collect();

    for a in &names {
        for b in &names {
            let score = token_set_ratio(a, b);
            assert!(score <= 100);
            assert_eq!(score, token_set_ratio(b, a), "{:?} vs {:?}", a, b);
        }
    }

    let result = classify_by_similarity(&names, &names);
    assert_eq!(result.len(), names.len());
    for row in result.rows() {
        if let MatchChoice::Candidate(idx) = row.choice {
            assert!(idx < names.len());
        }
    }
}

#[test]
fn test_non_ascii_names_still_match() {
    let source = vec!["Métal_Brossé".to_string()];
    let candidates = vec!["Brossé_Métal".to_string(), "Plastique".to_string()];

    let result = classify_by_similarity(&source, &candidates);
    assert_eq!(result.mapping()[0].1, "Brossé_Métal");
}

#[test]
fn test_large_library_is_stable() {
    let source: Vec<String> = (0..200).map(|i| format!("Paint_{}_Gloss", i)).collect();
    let candidates: Vec<String> = (0..200).rev().map(|i| format!("Gloss_Paint_{}", i)).collect();

    let start = Instant::now();
    let first = classify_by_similarity(&source, &candidates);
    println!("Matched 200x200 names in {:?}", start.elapsed());

    let second = classify_by_similarity(&source, &candidates);
    assert_eq!(first, second);

    // Same tokens in another order are a perfect match
    for (source_name, choice) in first.mapping() {
        let number = source_name.split('_').nth(1).unwrap();
        assert_eq!(choice, format!("Gloss_Paint_{}", number));
    }
}

#[test]
fn test_review_command_flood() {
    let source: Vec<String> = (0..25).map(|i| format!("Mat_{}", i)).collect();
    let candidates = vec!["Mat_3".to_string(), "Other".to_string()];
    let mut session = ReviewSession::new(classify_by_similarity(&source, &candidates));

    let commands = [
        "asdfghjkl",
        "999 Mat_3",
        "0 none",
        "1 Nope",
        "next",
        "next",
        "next",
        "previous",
        "3 = 2",
        "   ",
        "list",
    ];
    for _ in 0..20 {
        for command in commands {
            let _ = session.handle_command(command);
        }
    }

    assert!(session.is_active());
    assert_eq!(session.result().len(), 25);
    assert_eq!(session.result().mapping()[2].1, "Other");
    assert_eq!(session.handle_command("commit"), ReviewAction::Commit);
    assert!(session.finish().is_some());
}
