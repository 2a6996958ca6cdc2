use std::sync::Arc;

use sponsor_tracker::store::SqliteStore;
use sponsor_tracker::workflows::applications::{
    ApplicationPatch, ApplicationStatus, CompanyTarget, ManualNoteRequest, NewApplicationRequest,
    TimelineEntryKind, TrackerService,
};
use sponsor_tracker::workflows::sponsors::{CompanyDirectory, CompanyQuery, SponsorImporter};

const REGISTER: &str = "\
Organisation Name,Town/City,Type & Rating,Route
Harbour Health,Plymouth,Worker (A rating),Skilled Worker
Moor Engineering,Exeter,Worker (B rating),Skilled Worker
";

fn new_application(company_id: sponsor_tracker::workflows::sponsors::CompanyId) -> NewApplicationRequest {
    NewApplicationRequest {
        company: CompanyTarget::Existing { company_id },
        role: "Clinical Data Analyst".to_string(),
        status: None,
        applied_date: None,
        follow_up_date: None,
        notes: Some("Applied through NHS Jobs".to_string()),
        salary: Some("£38,000".to_string()),
        external_website: None,
        cv_version: Some("v3-health".to_string()),
    }
}

#[test]
fn tracking_an_application_from_import_to_offer() {
    let store = Arc::new(SqliteStore::open_in_memory().expect("store"));
    SponsorImporter::new(Arc::clone(&store))
        .import_reader(REGISTER.as_bytes(), "register.csv")
        .expect("import");
    let harbour = store
        .search(&CompanyQuery {
            town: Some("plymouth".to_string()),
            ..CompanyQuery::default()
        })
        .expect("search")
        .companies
        .remove(0);

    let user = store.upsert_user("jordan@example.com").expect("user");
    let tracker = TrackerService::new(Arc::clone(&store), Arc::clone(&store));

    let baseline = tracker.predict(user.id, harbour.id).expect("baseline");
    assert_eq!(baseline.interview_probability, 0.18);
    assert_eq!(baseline.offer_probability, 0.06);

    let created = tracker
        .create(user.id, new_application(harbour.id))
        .expect("created");
    let id = created.application.id;

    for status in [
        ApplicationStatus::Interview,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
    ] {
        tracker
            .update(
                user.id,
                id,
                ApplicationPatch {
                    status: Some(status),
                    ..ApplicationPatch::default()
                },
            )
            .expect("status update");
    }
    tracker
        .add_update(
            user.id,
            id,
            ManualNoteRequest {
                note: "Offer letter received".to_string(),
            },
        )
        .expect("note");

    let detail = tracker.get(user.id, id).expect("detail");
    assert_eq!(detail.application.status, ApplicationStatus::Offer);
    let kinds: Vec<_> = detail.updates.iter().map(|update| update.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TimelineEntryKind::Manual,
            TimelineEntryKind::StatusChange,
            TimelineEntryKind::StatusChange,
            TimelineEntryKind::InitialNote,
        ]
    );
    assert_eq!(
        detail.updates[1].note,
        "Status changed from INTERVIEW to OFFER"
    );

    let after = tracker.predict(user.id, harbour.id).expect("prediction");
    assert_eq!(after.sample_size, 1);
    assert_eq!(after.interview_probability, 0.99);
    assert_eq!(after.offer_probability, 0.99);

    let summary = tracker.summary(user.id).expect("summary");
    assert_eq!(summary.offer_rate, 100);
    assert_eq!(summary.top_region, "Plymouth");
}
