/// Request builder: snapshot both slots into one generation request
use crate::error::TryOnError;
use crate::state::data::EncodedImage;
use crate::state::slots::Slots;

/// Instruction sent with every try-on request.
///
/// Output quality depends heavily on this wording; it is not user-editable.
pub const TRY_ON_INSTRUCTION: &str = "\
You are a virtual fitting room. The first image shows a person and the second image shows a clothing item. \
Create a new image of the exact same person from the first image wearing the clothing item from the second image. \
Keep the person's face, facial features, hair, skin tone, body shape and pose exactly as they are in the first image. \
Replace only the garment they are wearing with the one from the second image, preserving its color, pattern, \
fabric and details, and fit it naturally to their body. Keep the original background and lighting. \
Return a single photorealistic image.";

/// Everything the remote model needs for one try-on
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// The person photo
    pub subject: EncodedImage,
    /// The clothing photo
    pub garment: EncodedImage,
    pub instruction: &'static str,
}

/// Build a request from the current slot contents.
///
/// The images are cloned, so later slot changes never affect a request that
/// has already been issued.
pub fn build(slots: &Slots) -> Result<GenerationRequest, TryOnError> {
    let (Some(subject), Some(garment)) = (slots.person.get(), slots.clothing.get()) else {
        return Err(TryOnError::IncompleteInput);
    };

    Ok(GenerationRequest {
        subject: subject.clone(),
        garment: garment.clone(),
        instruction: TRY_ON_INSTRUCTION,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(tag: &str, content_type: &str) -> EncodedImage {
        EncodedImage::from_bytes(tag.as_bytes(), content_type)
    }

    #[test]
    fn test_build_requires_both_slots() {
        let mut slots = Slots::new();
        assert_eq!(build(&slots), Err(TryOnError::IncompleteInput));

        slots.person.set(image("person", "image/jpeg"), "person.jpg");
        assert_eq!(build(&slots), Err(TryOnError::IncompleteInput));

        slots.person.clear();
        slots.clothing.set(image("shirt", "image/png"), "shirt.png");
        assert_eq!(build(&slots), Err(TryOnError::IncompleteInput));
    }

    #[test]
    fn test_build_orders_subject_then_garment() {
        let mut slots = Slots::new();
        slots.person.set(image("person", "image/jpeg"), "person.jpg");
        slots.clothing.set(image("shirt", "image/png"), "shirt.png");

        let request = build(&slots).unwrap();
        assert_eq!(request.subject, image("person", "image/jpeg"));
        assert_eq!(request.garment, image("shirt", "image/png"));
        assert_eq!(request.instruction, TRY_ON_INSTRUCTION);
    }

    #[test]
    fn test_request_is_a_snapshot() {
        let mut slots = Slots::new();
        slots.person.set(image("person", "image/jpeg"), "person.jpg");
        slots.clothing.set(image("shirt", "image/png"), "shirt.png");

        let request = build(&slots).unwrap();
        slots.clothing.set(image("dress", "image/webp"), "dress.webp");
        slots.person.clear();

        assert_eq!(request.garment, image("shirt", "image/png"));
        assert_eq!(request.subject, image("person", "image/jpeg"));
    }

    #[test]
    fn test_instruction_keeps_identity_and_swaps_garment() {
        let instruction = TRY_ON_INSTRUCTION.to_lowercase();
        for phrase in ["facial features", "hair", "body shape", "pose", "only the garment", "photorealistic"] {
            assert!(instruction.contains(phrase), "instruction is missing {:?}", phrase);
        }
    }
}
