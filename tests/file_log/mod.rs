mod writer_case;
