use lumen_image::dump;

use crate::cli::DumpParams;

pub fn run(params: DumpParams) {
    let image = super::load_image(&params.image, params.verify);
    print!("{}", dump(&image));
}
