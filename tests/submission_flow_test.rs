mod support;

use anyhow::Result;
use tempfile::tempdir;

use fan_intake::app::ports::FanStorePort;
use fan_intake::app::{InsightsReport, SubmissionUseCase};
use fan_intake::error::{ConsistencyError, FanError};
use fan_intake::types::{PlatformProfile, SubmissionContext};

use support::{form, png, sqlite_store, FixedModel, FixedOcr, VALID_TAX_ID};

#[tokio::test]
async fn accepted_submission_is_persisted_with_canonical_tax_id() -> Result<()> {
    let dir = tempdir()?;
    let store = sqlite_store(&dir);
    let model = FixedModel::answering("unused");
    let use_case = SubmissionUseCase::new(
        FixedOcr::reading(&format!("REPUBLICA FEDERATIVA\nCPF {VALID_TAX_ID}\n")),
        model.clone(),
        store.clone(),
    );

    let receipt = use_case
        .submit(&form("Maria Silva", "11144477735"), Some(&png()), &SubmissionContext::default())
        .await?;

    assert_eq!(receipt.link_review.raw, "no links provided");
    assert_eq!(model.calls(), 0);

    let rows = store.list_all().await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tax_id, VALID_TAX_ID);
    assert_eq!(rows[0].name, "Maria Silva");
    assert_eq!(rows[0].validated_links, "no links provided");
    assert_eq!(rows[0].detected_themes, "");
    Ok(())
}

#[tokio::test]
async fn link_review_and_profile_are_stored() -> Result<()> {
    let dir = tempdir()?;
    let store = sqlite_store(&dir);
    let answer = "https://www.hltv.org/player/1 - professional player\n";
    let use_case = SubmissionUseCase::new(
        FixedOcr::reading(VALID_TAX_ID),
        FixedModel::answering(answer),
        store.clone(),
    );

    let mut submission = form("Maria Silva", VALID_TAX_ID);
    submission.profile_links = "https://www.hltv.org/player/1\nhttps://example.com/me".into();
    let context = SubmissionContext {
        profile: Some(PlatformProfile {
            login: "maria_gamer".into(),
            followed_channels: vec!["gaules".into(), "loud_coringa".into()],
            detected_themes: vec!["FPS".into(), "Variety".into()],
        }),
    };

    let receipt = use_case.submit(&submission, Some(&png()), &context).await?;
    assert_eq!(receipt.link_review.entries.len(), 1);
    assert_eq!(receipt.link_review.entries[0].category, "professional player");

    let rows = store.list_all().await?;
    assert_eq!(rows[0].validated_links, answer.trim());
    assert_eq!(rows[0].followed_channels, "gaules, loud_coringa");
    assert_eq!(rows[0].detected_themes, "FPS, Variety");

    let report = InsightsReport::from_rows(&rows);
    assert_eq!(report.total_fans, 1);
    assert_eq!(report.categories.len(), 2);
    assert_eq!(report.top_streamers[0].label, "gaules");
    Ok(())
}

#[tokio::test]
async fn mismatched_document_writes_nothing() -> Result<()> {
    let dir = tempdir()?;
    let store = sqlite_store(&dir);
    let use_case = SubmissionUseCase::new(
        FixedOcr::reading("CPF 529.982.247-25"),
        FixedModel::answering("unused"),
        store.clone(),
    );

    let err = use_case
        .submit(&form("Maria Silva", VALID_TAX_ID), Some(&png()), &SubmissionContext::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FanError::Consistency(ConsistencyError::Mismatch { .. })
    ));
    assert!(store.list_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn model_outage_aborts_the_attempt() -> Result<()> {
    let dir = tempdir()?;
    let store = sqlite_store(&dir);
    let use_case = SubmissionUseCase::new(
        FixedOcr::reading(VALID_TAX_ID),
        FixedModel::unavailable(),
        store.clone(),
    );

    let mut submission = form("Maria Silva", VALID_TAX_ID);
    submission.profile_links = "https://www.hltv.org/player/1".into();
    let err = use_case
        .submit(&submission, Some(&png()), &SubmissionContext::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FanError::ExternalService(_)));
    assert!(store.list_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_fields_skip_ocr() -> Result<()> {
    let dir = tempdir()?;
    let store = sqlite_store(&dir);
    let ocr = FixedOcr::reading(VALID_TAX_ID);
    let use_case = SubmissionUseCase::new(ocr.clone(), FixedModel::answering("unused"), store.clone());

    let err = use_case
        .submit(&form("Maria", "123.456.789-00"), Some(&png()), &SubmissionContext::default())
        .await
        .unwrap_err();

    match err {
        FanError::Validation(errors) => assert_eq!(errors.0.len(), 2),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(ocr.calls(), 0);
    assert!(store.list_all().await?.is_empty());
    Ok(())
}
