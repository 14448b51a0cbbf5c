use super::types::BookingRequest;

/// Pre-filled mail composition used when the form endpoint is unreachable.
pub fn booking_mailto(contact_email: &str, subject: &str, request: &BookingRequest) -> String {
    let body = format!(
        "Name: {}\nCountry: {}\nLocation: {}\nAddress: {}\n\n{}",
        request.name, request.country, request.location, request.address, request.message
    );
    format!(
        "mailto:{}?subject={}&body={}",
        contact_email,
        urlencoding::encode(subject),
        urlencoding::encode(&body)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailto_encodes_subject_and_body() {
        let req = BookingRequest {
            name: "Mette & Jonas".to_string(),
            country: "Denmark".to_string(),
            location: "Aarhus".to_string(),
            address: "Havnegade 4".to_string(),
            message: "Forty chairs?".to_string(),
            ..Default::default()
        };
        let url = booking_mailto(
            "annmcbryan@gmail.com",
            "Songs Across Europe 2026 request",
            &req,
        );

        assert!(url.starts_with(
            "mailto:annmcbryan@gmail.com?subject=Songs%20Across%20Europe%202026%20request&body="
        ));
        assert!(url.contains("Name%3A%20Mette%20%26%20Jonas%0ACountry%3A%20Denmark"));
        assert!(url.ends_with("Forty%20chairs%3F"));
    }
}
