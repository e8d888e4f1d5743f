use super::*;
use std::sync::Arc;

use crate::embedding::{EmbeddingProvider, MockEmbedder, StubEmbedder};
use crate::tokenizer::{SpecialTokenIds, SpecialTokens, VocabTokenizer, Vocabulary};

const PIECES: &[&str] = &[
    "<unk>",
    "<s>",
    "</s>",
    "\u{2581}",
    "\u{2581}billing",
    "\u{2581}network",
    "\u{2581}payment",
    "\u{2581}legal",
    "\u{2581}issue",
    "\u{2581}my",
    "\u{2581}invoice",
    "\u{2581}is",
    "\u{2581}wrong",
    "s",
];

fn tokenizer() -> Arc<VocabTokenizer> {
    let vocab = Vocabulary::from_pieces(
        PIECES.iter().copied(),
        &SpecialTokens::default(),
        SpecialTokenIds::default(),
    )
    .expect("vocab");
    Arc::new(VocabTokenizer::new(Arc::new(vocab), 64, 1).expect("tokenizer"))
}

fn scenario_engine() -> (SimilarityEngine, Arc<MockEmbedder>) {
    let tokenizer = tokenizer();
    let provider = Arc::new(
        MockEmbedder::new(2)
            .with_text(&tokenizer, "billing issue", vec![1.0, 0.0])
            .with_text(&tokenizer, "network issue", vec![0.0, 1.0])
            .with_text(&tokenizer, "my invoice is wrong", vec![0.9, 0.1]),
    );
    let engine = SimilarityEngine::new(
        ["billing issue", "network issue"],
        tokenizer,
        provider.clone(),
    )
    .expect("engine");
    (engine, provider)
}

fn stub_engine(skills: &[&str]) -> SimilarityEngine {
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(StubEmbedder::new(32).unwrap());
    SimilarityEngine::new(skills.iter().copied(), tokenizer(), provider).expect("engine")
}

const POOL: &[&str] = &[
    "billing issue",
    "network issue",
    "payment issues",
    "legal issue",
    "my invoice",
];

mod construction_tests {
    use super::*;

    #[test]
    fn test_pool_embedded_in_single_call() {
        let (engine, provider) = scenario_engine();
        assert_eq!(provider.calls(), 1);
        assert_eq!(engine.len(), 2);
        assert_eq!(engine.skills(), &["billing issue", "network issue"]);
    }

    #[test]
    fn test_caches_embeddings_and_norms() {
        let (engine, _) = scenario_engine();
        assert_eq!(engine.skill_embedding(0), Some(&[1.0, 0.0][..]));
        assert_eq!(engine.skill_embedding(1), Some(&[0.0, 1.0][..]));
        assert_eq!(engine.skill_norm(0), Some(1.0));
        assert_eq!(engine.skill_embedding(2), None);
    }

    #[test]
    fn test_hidden_dim_discovered_from_provider() {
        let (engine, _) = scenario_engine();
        assert_eq!(engine.hidden_dim(), 2);
        assert_eq!(stub_engine(POOL).hidden_dim(), 32);
    }

    #[test]
    fn test_empty_pool_rejected_before_embedding() {
        let provider = Arc::new(MockEmbedder::new(2).with_fallback(vec![1.0, 1.0]));
        let result = SimilarityEngine::new(Vec::<String>::new(), tokenizer(), provider.clone());

        let err = result.expect_err("empty pool must fail");
        assert!(err.is_invalid_argument());
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_provider_failure_is_load_error() {
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbedder::failing("model offline"));
        let err = SimilarityEngine::new(["billing issue"], tokenizer(), provider)
            .expect_err("construction must fail");

        assert!(err.is_load_error());
        assert!(err.to_string().contains("model offline"));
    }

    #[test]
    fn test_default_top_k() {
        let engine = stub_engine(POOL);
        assert_eq!(engine.default_top_k(), crate::constants::DEFAULT_TOP_K);

        let engine = engine.with_default_top_k(2);
        assert_eq!(engine.rank_default("billing").unwrap().len(), 2);
    }

    #[test]
    fn test_debug_output() {
        let engine = stub_engine(POOL);
        let debug = format!("{:?}", engine);
        assert!(debug.contains("SimilarityEngine"));
        assert!(debug.contains("hidden_dim: 32"));
    }
}

mod rank_tests {
    use super::*;

    #[test]
    fn test_contrived_scenario() {
        let (engine, _) = scenario_engine();
        let ranked = engine.rank("my invoice is wrong", 1).unwrap();

        assert_eq!(ranked.len(), 1);
        let top = ranked.top().unwrap();
        assert_eq!(top.label, "billing issue");
        assert_eq!(top.index, 0);
        assert!((top.score - 0.9938837).abs() < 1e-4, "score {}", top.score);
    }

    #[test]
    fn test_full_pool_when_k_exceeds_size() {
        let (engine, _) = scenario_engine();
        let ranked = engine.rank("my invoice is wrong", 10).unwrap();

        assert_eq!(ranked.labels(), vec!["billing issue", "network issue"]);
        let scores = ranked.scores();
        assert!((scores[1] - 0.1104315).abs() < 1e-4);
    }

    #[test]
    fn test_rank_calls_provider_once_per_query() {
        let (engine, provider) = scenario_engine();
        engine.rank("my invoice is wrong", 1).unwrap();
        engine.rank("my invoice is wrong", 2).unwrap();
        assert_eq!(provider.calls(), 3);
    }

    #[test]
    fn test_zero_k_rejected() {
        let (engine, provider) = scenario_engine();
        let err = engine.rank("my invoice is wrong", 0).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_result_length_and_order() {
        let engine = stub_engine(POOL);
        for k in 1..=POOL.len() + 2 {
            let ranked = engine.rank("my invoice is wrong", k).unwrap();
            assert_eq!(ranked.len(), k.min(POOL.len()));
            let scores = ranked.scores();
            assert!(scores.windows(2).all(|w| w[0] >= w[1]), "k = {k}: {scores:?}");
        }
    }

    #[test]
    fn test_partial_selection_agrees_with_full_ranking() {
        let engine = stub_engine(POOL);
        let full = engine.rank("network issues", POOL.len()).unwrap();
        for k in 1..POOL.len() {
            let partial = engine.rank("network issues", k).unwrap();
            assert_eq!(partial.as_slice(), &full.as_slice()[..k]);
        }
    }

    #[test]
    fn test_self_similarity() {
        let engine = stub_engine(POOL);
        for label in POOL {
            let ranked = engine.rank(label, 1).unwrap();
            let top = ranked.top().unwrap();
            assert_eq!(&top.label, label);
            assert!((top.score - 1.0).abs() < 1e-4, "{label}: {}", top.score);
        }
    }

    #[test]
    fn test_ties_keep_pool_order() {
        let tokenizer = tokenizer();
        let provider = Arc::new(
            MockEmbedder::new(2)
                .with_text(&tokenizer, "legal issue", vec![0.0, 1.0])
                .with_text(&tokenizer, "billing issue", vec![1.0, 0.0])
                .with_text(&tokenizer, "payment issues", vec![1.0, 0.0])
                .with_text(&tokenizer, "network issue", vec![0.6, 0.8])
                .with_fallback(vec![1.0, 0.0]),
        );
        let engine = SimilarityEngine::new(
            ["legal issue", "billing issue", "payment issues", "network issue"],
            tokenizer,
            provider,
        )
        .unwrap();

        let ranked = engine.rank("anything", 4).unwrap();
        assert_eq!(
            ranked.labels(),
            vec!["billing issue", "payment issues", "network issue", "legal issue"]
        );

        let top_two = engine.rank("anything", 2).unwrap();
        assert_eq!(top_two.labels(), vec!["billing issue", "payment issues"]);
    }

    #[test]
    fn test_overflowing_embeddings_rank_last() {
        let tokenizer = tokenizer();
        let labels: Vec<String> = (1..=40).map(|n| vec!["billing"; n].join(" ")).collect();

        let mut provider =
            MockEmbedder::new(2).with_text(&tokenizer, "legal", vec![1.0, 0.5]);
        for (i, label) in labels.iter().enumerate() {
            let vector = if i % 3 == 0 {
                vec![3.0e38, 3.0e38]
            } else {
                let angle = ((i * 7) % 40) as f32 * 0.05;
                vec![angle.cos(), angle.sin()]
            };
            provider = provider.with_text(&tokenizer, label, vector);
        }

        let engine =
            SimilarityEngine::new(labels.clone(), tokenizer, Arc::new(provider)).unwrap();
        let ranked = engine.rank("legal", labels.len()).unwrap();
        assert_eq!(ranked.len(), 40);

        let overflowing = labels.len().div_ceil(3);
        let (finite, rest) = ranked.as_slice().split_at(labels.len() - overflowing);
        assert!(finite.iter().all(|e| e.score.is_finite()));
        assert!(finite.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(rest.iter().all(|e| e.index % 3 == 0));
        assert!(rest.windows(2).all(|w| w[0].index < w[1].index));

        let top_five = engine.rank("legal", 5).unwrap();
        assert_eq!(top_five.as_slice(), &ranked.as_slice()[..5]);
    }

    #[test]
    fn test_zero_norm_query_scores_zero() {
        let tokenizer = tokenizer();
        let provider = Arc::new(
            MockEmbedder::new(2)
                .with_text(&tokenizer, "billing issue", vec![1.0, 0.0])
                .with_text(&tokenizer, "network issue", vec![0.0, 1.0])
                .with_fallback(vec![0.0, 0.0]),
        );
        let engine =
            SimilarityEngine::new(["billing issue", "network issue"], tokenizer, provider).unwrap();

        let ranked = engine.rank("", 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|e| e.score == 0.0));
        assert_eq!(ranked.labels(), vec!["billing issue", "network issue"]);
    }

    #[test]
    fn test_query_failure_surfaces_unchanged() {
        let (engine, _) = scenario_engine();
        let err = engine.rank("something unregistered", 1).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Embedding(crate::embedding::EmbeddingError::InferenceFailed { .. })
        ));
    }

    #[test]
    fn test_rank_is_deterministic() {
        let engine = stub_engine(POOL);
        let first = engine.rank("my invoice is wrong", 3).unwrap();
        let second = engine.rank("my invoice is wrong", 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_rank() {
        let engine = stub_engine(POOL);
        let expected = engine.rank("payment issues", 3).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| engine.rank("payment issues", 3).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}

mod embed_tests {
    use super::*;

    #[test]
    fn test_embed_batch_matches_single() {
        let engine = stub_engine(POOL);
        let batch = engine.embed_batch(&["billing issue", "legal"]).unwrap();
        assert_eq!(batch.len(), 2);

        let single = engine.embed("legal").unwrap();
        for (a, b) in batch[1].iter().zip(&single) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_embed_batch_empty_rejected() {
        let engine = stub_engine(POOL);
        let err = engine.embed_batch::<&str>(&[]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_embeddings_are_finite() {
        let engine = stub_engine(POOL);
        let vectors = engine.embed_batch(&["", "billing", "\u{1f600}"]).unwrap();
        assert!(vectors.iter().flatten().all(|v| v.is_finite()));
        assert!(vectors.iter().all(|v| v.len() == engine.hidden_dim()));
    }
}

mod result_tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let (engine, _) = scenario_engine();
        let ranked = engine.rank("my invoice is wrong", 2).unwrap();
        let text = ranked.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1\t0.99"));
        assert!(lines[0].ends_with("\tbilling issue"));
    }

    #[test]
    fn test_serializes_as_list() {
        let (engine, _) = scenario_engine();
        let ranked = engine.rank("my invoice is wrong", 1).unwrap();
        let json = serde_json::to_value(&ranked).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["label"], "billing issue");
        assert_eq!(json[0]["index"], 0);
    }

    #[test]
    fn test_into_iter() {
        let (engine, _) = scenario_engine();
        let ranked = engine.rank("my invoice is wrong", 2).unwrap();
        let indices: Vec<usize> = ranked.into_iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }
}
