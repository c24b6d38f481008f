// Create the Error, ErrorKind, ResultExt, and Result types.
// Other modules `use errors::*;` to get access to everything `error_chain!` creates.
#![allow(deprecated)]

error_chain! {

    errors {
        InvalidConfiguration(reason: String) {
            description("invalid labyrinth configuration")
            display("invalid labyrinth configuration: {}", reason)
        }

        EmptyTopology {
            description("cannot carve a topology without any cells")
            display("cannot carve a topology without any cells")
        }

        UnknownPolicy(name: String) {
            description("unknown entrance or exit policy")
            display("unknown entrance or exit policy: '{}'", name)
        }
    }
}
