//! Reference procedures loaded by `sirat-server --seed`.

use sirat_core::{
  input::{
    NewCommonMistake, NewOfficeLocation, NewProcedure, NewRequiredDocument,
    NewSourceLink, NewStep,
  },
  procedure::{Procedure, Status},
  store::ProcedureStore as _,
};

use crate::{Result, SqliteStore};

impl SqliteStore {
  /// Replace the entire contents of the store with [`reference_procedures`].
  pub async fn seed(&self) -> Result<Vec<Procedure>> {
    let removed = self.clear_all().await?;
    tracing::info!(removed, "cleared existing procedures");

    let mut created = Vec::new();
    for input in reference_procedures() {
      created.push(self.create(input).await?);
    }
    tracing::info!(count = created.len(), "seeded procedures");
    Ok(created)
  }
}

fn office(
  name: &str,
  sub_city: &str,
  woreda: &str,
  map_link: Option<&str>,
  hours: &str,
) -> NewOfficeLocation {
  NewOfficeLocation {
    name:          name.into(),
    sub_city:      Some(sub_city.into()),
    woreda:        Some(woreda.into()),
    map_link:      map_link.map(Into::into),
    working_hours: Some(hours.into()),
  }
}

/// The procedures every fresh installation starts with.
pub fn reference_procedures() -> Vec<NewProcedure> {
  vec![passport(), lost_kebele_id(), trade_license_renewal()]
}

fn passport() -> NewProcedure {
  NewProcedure {
    title: "Passport Application (New)".into(),
    category: "Identity & Travel".into(),
    city: Some("Addis Ababa".into()),
    overview: "The standard process for obtaining a new Ethiopian passport. \
      Since 2023, most of the initial process is conducted online via the \
      official immigration portal."
      .into(),
    eligibility: "Ethiopian citizens who do not currently hold a valid \
      passport. For minors, parental consent and presence are required."
      .into(),
    estimated_cost: Some("600 ETB (32 pages) / 2186 ETB (64 pages)".into()),
    estimated_duration: Some("2-4 Weeks".into()),
    status: Some(Status::Published),
    steps: vec![
      NewStep::new(
        "Online Registration",
        "Visit ethiopianpassportservices.gov.et and fill out the detailed application form.",
      ),
      NewStep::new(
        "Payment",
        "Pay the fee through CBE Birr, Telebirr, or M-Pesa using the reference number provided.",
      ),
      NewStep::new(
        "Book Appointment",
        "Choose a date and physical branch (e.g., Main Office near Churchill Road) for biometrics.",
      ),
      NewStep::new(
        "Physical Visit",
        "Go to the office on your appointment day with printed forms and original Kebele ID.",
      ),
    ],
    required_documents: vec![
      NewRequiredDocument::new("Kebele ID", "Original + Copy")
        .with_notes("Must be valid and renewed"),
      NewRequiredDocument::new("Birth Certificate", "Original + Copy"),
      NewRequiredDocument::new("Digital Receipt", "Printout")
        .with_notes("From the online payment"),
    ],
    common_mistakes: vec![
      NewCommonMistake::new("Going to the office without an appointment."),
      NewCommonMistake::new("Using an expired Kebele ID for the biometrics phase."),
    ],
    office_locations: vec![office(
      "Main Immigration Office",
      "Kirkos",
      "08",
      Some("https://maps.google.com"),
      "8:00 AM - 5:00 PM",
    )],
    source_links: vec![NewSourceLink::new(
      "Official Passport Portal",
      "https://ethiopianpassportservices.gov.et",
    )],
  }
}

fn lost_kebele_id() -> NewProcedure {
  NewProcedure {
    title: "Lost Kebele ID Replacement".into(),
    category: "Civil Status".into(),
    city: Some("Addis Ababa".into()),
    overview: "Replace your lost or stolen Kebele ID card. This process \
      typically takes 3-14 days and must be done at your registered Woreda \
      office. You will need a police report and passport photos."
      .into(),
    eligibility: "Ethiopian citizens registered in Addis Ababa kebeles who \
      have lost their original ID card. Minors need parental presence."
      .into(),
    estimated_cost: Some("50 - 150 ETB".into()),
    estimated_duration: Some("3 - 14 Days".into()),
    status: Some(Status::Published),
    steps: vec![
      NewStep::new(
        "Report the Loss",
        "Visit the nearest police station to report your lost ID. Bring any \
         ID copy if available and personal details. You will receive a police \
         loss letter.",
      ),
      NewStep::new(
        "Prepare Documents",
        "Gather: Police loss letter, 2 passport photos, old ID copy (if any), \
         and letter from kebele (if applicable).",
      ),
      NewStep::new(
        "Visit Kebele Office",
        "Go to your registered Woreda office during office hours (8:00 AM - \
         5:00 PM). Best time is early morning. Expect to queue and have a \
         brief interview.",
      ),
      NewStep::new(
        "Payment",
        "Pay the replacement fee (50-150 ETB) at the designated payment window \
         or via mobile money.",
      ),
      NewStep::new(
        "Follow-up & Collection",
        "Return after 3-14 days to collect your new ID. Bring your receipt and \
         any temporary document issued.",
      ),
    ],
    required_documents: vec![
      NewRequiredDocument::new("Police Loss Letter", "Original")
        .with_notes("Must be stamped and sealed by police station"),
      NewRequiredDocument::new("Passport Photos", "Physical")
        .with_count(2)
        .with_notes("White background, recent photos"),
      NewRequiredDocument::new("Old ID Copy", "Copy")
        .with_notes("If available - helps with verification"),
      NewRequiredDocument::new("Personal Details", "Information")
        .with_notes("Full name, house number, family details"),
    ],
    common_mistakes: vec![
      NewCommonMistake::new("Going without police loss letter - this is mandatory"),
      NewCommonMistake::new(
        "Not bringing passport photos or bringing wrong background color",
      ),
      NewCommonMistake::new(
        "Assuming rules are same for all kebeles - each may have variations",
      ),
      NewCommonMistake::new("Arriving late in the day when offices are busy or closing"),
      NewCommonMistake::new("Going to wrong Woreda - must be where you are registered"),
    ],
    office_locations: vec![
      office(
        "Kirkos Sub-City Administration",
        "Kirkos",
        "Various",
        None,
        "8:00 AM - 5:00 PM",
      ),
      office(
        "Bole Sub-City Administration",
        "Bole",
        "Various",
        None,
        "8:00 AM - 5:00 PM",
      ),
    ],
    source_links: vec![NewSourceLink::new(
      "Addis Ababa City Administration",
      "https://addisababa.gov.et",
    )],
  }
}

fn trade_license_renewal() -> NewProcedure {
  NewProcedure {
    title: "Trade License Renewal".into(),
    category: "Business".into(),
    city: Some("Addis Ababa".into()),
    overview: "Annual renewal of business trade licenses through the Ministry \
      of Trade or Regional Bureaus."
      .into(),
    eligibility: "Sole proprietors or companies with an existing Ethiopian \
      trade license."
      .into(),
    estimated_cost: Some("500+ ETB (Varies by capital)".into()),
    estimated_duration: Some("1 Day".into()),
    status: Some(Status::Published),
    steps: vec![
      NewStep::new(
        "Tax Clearance",
        "Visit the Revenue Authority (Inland Revenue) to get a tax clearance \
         certificate for the physical year.",
      ),
      NewStep::new("Application", "Submit the renewal form at the Trade Bureau desk."),
      NewStep::new(
        "Fee Payment",
        "Pay the renewal fee at the designated bank or via Telebirr.",
      ),
    ],
    required_documents: vec![
      NewRequiredDocument::new("Original Trade License", "Original"),
      NewRequiredDocument::new("Tax Clearance Certificate", "Original")
        .with_notes("Most critical document"),
      NewRequiredDocument::new("Rent Contract", "Copy")
        .with_notes("Must be authenticated by the house registry"),
    ],
    common_mistakes: Vec::new(),
    office_locations: Vec::new(),
    source_links: Vec::new(),
  }
}
