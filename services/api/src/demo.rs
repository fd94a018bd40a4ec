use std::sync::Arc;

use clap::Args;
use serde_json::json;

use crate::infra::{
    InMemoryCatalogStore, InMemoryProfileStore, SessionDirectory, TracingNotifier,
};
use classifieds::catalog::{
    CatalogService, FieldValue, ListingDraft, ListingKind, MemberProfile, Principal,
    SessionProvider, SubmitReceipt,
};
use classifieds::config::SessionConfig;
use classifieds::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Member id used for the walkthrough
    #[arg(long, default_value = "member-demo")]
    pub(crate) member: String,
    /// Skip the deletion portion of the walkthrough
    #[arg(long)]
    pub(crate) skip_delete: bool,
}

/// Walk the whole listing lifecycle on the command line: gate denials,
/// profile completion, creation, disclosure, edit, and two-step delete.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        member,
        skip_delete,
    } = args;

    let store = Arc::new(InMemoryCatalogStore::default());
    let profiles = Arc::new(InMemoryProfileStore::default());
    let notifier = Arc::new(TracingNotifier);
    let sessions = Arc::new(SessionDirectory::new(
        &SessionConfig::default(),
        profiles.clone(),
    ));
    let service = CatalogService::new(store, profiles, notifier);

    println!("Classifieds catalog walkthrough");

    // 1. an anonymous visitor finds an empty catalog
    let visitor = Principal::Anonymous;
    let listings = service.browse(&visitor, ListingKind::Vehicle)?;
    println!("- Anonymous browse: {} vehicle listings", listings.len());

    // 2. the gate refuses anonymous and profile-less callers
    match service.open_create(&visitor, ListingKind::Vehicle) {
        Err(err) => println!("- Anonymous create attempt: {}", err),
        Ok(_) => println!("- Anonymous create attempt unexpectedly allowed"),
    }

    sessions.issue("tok-demo", &member);
    let signed_in = sessions.current_principal(Some("tok-demo"));
    match service.open_create(&signed_in, ListingKind::Vehicle) {
        Err(err) => println!("- Create before completing the profile: {}", err),
        Ok(_) => println!("- Create before completing the profile unexpectedly allowed"),
    }

    // 3. completing the profile unlocks the listing form
    service.save_profile(&signed_in, MemberProfile::named("Demo Member"))?;
    let seller = sessions.current_principal(Some("tok-demo"));
    println!("- Profile completed for {member}");

    let mut session = service.open_create(&seller, ListingKind::Vehicle)?;
    let mut draft = ListingDraft::default()
        .with_text("title", "Mercedes Atego 2426")
        .with_text("brand", "Mercedes")
        .with_text("model", "Atego 2426")
        .with_field("year", FieldValue::Integer(2015))
        .with_field("price", FieldValue::Decimal(150_000.0));
    draft.contact_phone = Some("(11) 99999-9999".to_string());
    draft.contact_email = Some("demo@example.com".to_string());

    let receipt = service.submit(&mut session, &seller, draft.clone())?;
    let SubmitReceipt::Created(record) = receipt else {
        println!("- Create submit did not produce a record");
        return Ok(());
    };
    println!("- Published listing {}", record.id.0);

    // 4. disclosure differs per caller
    let anonymous_views = service.browse(&visitor, ListingKind::Vehicle)?;
    println!(
        "  Anonymous view of contacts: {}",
        json!(anonymous_views[0].contact_phone)
    );
    let member_views = service.browse(&seller, ListingKind::Vehicle)?;
    println!(
        "  Signed-in view of contacts: {}",
        json!(member_views[0].contact_phone)
    );

    // 5. edit resends full state
    let (mut edit_session, _loaded) =
        service.open_edit(&seller, ListingKind::Vehicle, record.id.clone())?;
    let updated_draft = draft.with_field("price", FieldValue::Decimal(139_000.0));
    service.submit(&mut edit_session, &seller, updated_draft)?;
    println!("- Updated listing {} with a lower price", record.id.0);

    if skip_delete {
        return Ok(());
    }

    // 6. two-step delete: request a token, then confirm
    let token = service.request_delete(ListingKind::Vehicle, &record.id)?;
    service.confirm_delete(token)?;
    let remaining = service.browse(&visitor, ListingKind::Vehicle)?;
    let audit = service.inspect(&seller, ListingKind::Vehicle, &record.id)?;
    println!(
        "- Soft-deleted listing {}: {} active listings remain, row kept with active={}",
        record.id.0,
        remaining.len(),
        audit.active
    );

    Ok(())
}
