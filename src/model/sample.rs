use super::{Address, Email, FieldError, Name, PersonDetails, Phone, Tag};

const SAMPLE_PEOPLE: &[(&str, &str, &str, &str, &[&str])] = &[
    (
        "Alex Yeoh",
        "87438807",
        "alexyeoh@example.com",
        "Blk 30 Geylang Street 29, #06-40",
        &["friends"],
    ),
    (
        "Bernice Yu",
        "99272758",
        "berniceyu@example.com",
        "Blk 30 Lorong 3 Serangoon Gardens, #07-18",
        &["colleagues", "friends"],
    ),
    (
        "Charlotte Oliveiro",
        "93210283",
        "charlotte@example.com",
        "Blk 11 Ang Mo Kio Street 74, #11-04",
        &["neighbours"],
    ),
    (
        "David Li",
        "91031282",
        "lidavid@example.com",
        "Blk 436 Serangoon Gardens Street 26, #16-43",
        &["family"],
    ),
    (
        "Irfan Ibrahim",
        "92492021",
        "irfan@example.com",
        "Blk 47 Tampines Street 20, #17-35",
        &["classmates"],
    ),
    (
        "Roy Balakrishnan",
        "92624417",
        "royb@example.com",
        "Blk 45 Aljunied Street 85, #11-31",
        &["colleagues"],
    ),
];

/// People a fresh session starts with.
pub fn sample_people() -> Result<Vec<PersonDetails>, FieldError> {
    SAMPLE_PEOPLE
        .iter()
        .map(|(name, phone, email, address, tags)| {
            Ok(PersonDetails {
                name: Name::parse(name)?,
                phone: Phone::parse(phone)?,
                email: Email::parse(email)?,
                address: Address::parse(address)?,
                tags: tags.iter().map(|t| Tag::parse(t)).collect::<Result<_, _>>()?,
            })
        })
        .collect()
}
