use crate::cli::CheckParams;

pub fn run(params: CheckParams) {
    let image = super::load_image(&params.image, params.verify);
    let h = image.header();
    println!(
        "ok: isa v{}, {} code bytes, {} data words, {} read keys, {} write keys, {} published, {} pixel objects",
        h.isa_version,
        h.code_length,
        image.data_count(),
        image.read_keys().len(),
        image.write_keys().len(),
        image.publish().len(),
        image.pixel_objects().len(),
    );
}
