use super::domain::{AdministratorDetails, ContactDetails, RegistrationSubmission};

/// Sample sign-ups used to populate an empty store for demos.
pub fn demo_submissions() -> Vec<RegistrationSubmission> {
    vec![
        submission(
            "City General Hospital",
            "HL-2024-001",
            ("admin@citygeneral.org", "+1-555-0101", "12 Harbor Road", "Springfield"),
            ("Dr. Amelia Hart", "a.hart@citygeneral.org", "+1-555-0102"),
        ),
        submission(
            "St. Mary's Medical Center",
            "HL-2024-002",
            ("contact@stmarys.org", "+1-555-0201", "400 Cathedral Ave", "Riverton"),
            ("Dr. Samuel Okafor", "s.okafor@stmarys.org", "+1-555-0202"),
        ),
        submission(
            "Lakeside Community Clinic",
            "HL-2024-003",
            ("info@lakesideclinic.org", "+1-555-0301", "8 Shore Lane", "Lakeside"),
            ("Priya Raman", "", "+1-555-0302"),
        ),
    ]
}

fn submission(
    hospital_name: &str,
    license_number: &str,
    (email, phone, address, city): (&str, &str, &str, &str),
    (admin_name, admin_email, admin_phone): (&str, &str, &str),
) -> RegistrationSubmission {
    RegistrationSubmission {
        hospital_name: hospital_name.to_string(),
        license_number: license_number.to_string(),
        contact: ContactDetails {
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            city: city.to_string(),
        },
        administrator: AdministratorDetails {
            name: admin_name.to_string(),
            email: admin_email.to_string(),
            phone: admin_phone.to_string(),
        },
    }
}
